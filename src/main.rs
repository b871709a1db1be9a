//! Pomo - A command-line pomodoro timer
//!
//! This is the main entry point for the pomo application.

use anyhow::Context;
use std::{io, sync::Arc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use pomo::{
    config::{Command, Config, StartArgs},
    engine::{RealClock, RunOutcome, Timer},
    ui::{JsonLines, Progress, Renderer},
    utils::cancel_on_shutdown,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so they never break the progress line on stdout
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomo={}", config.log_level()))
        .with_writer(io::stderr)
        .init();

    match config.command {
        Command::Start(args) => run_start(args).await,
    }
}

async fn run_start(args: StartArgs) -> anyhow::Result<()> {
    info!("Configuration: {:?}", args);

    if !args.json {
        println!("{}", args.banner());
        println!();
    }

    let mut timer = Timer::with_clock(
        args.session_config(),
        Arc::new(RealClock),
        args.tick_interval(),
    );
    let mut renderer: Box<dyn Renderer> = if args.json {
        Box::new(JsonLines::new(io::stdout()))
    } else {
        Box::new(Progress::new(timer.session().total_phases(), io::stdout()))
    };

    // One token per run, cancelled by SIGINT/SIGTERM
    let cancel = CancellationToken::new();
    let signal_listener = cancel_on_shutdown(cancel.clone());

    let (events_tx, mut events_rx) = mpsc::channel(1);
    let token = cancel.clone();
    let timer_task = tokio::spawn(async move {
        let result = timer.run(&token, events_tx).await;
        (result, timer.session().cycles_complete())
    });

    // Drain until the timer closes the stream, even after cancellation
    while let Some(event) = events_rx.recv().await {
        renderer.update(&event).context("Failed to render progress")?;
    }
    renderer.finish().context("Failed to render progress")?;

    let (result, cycles_complete) = timer_task.await.context("Timer task failed")?;
    signal_listener.abort();

    match result? {
        RunOutcome::Completed => {
            if !args.json {
                println!();
                println!("Session complete!");
            }
        }
        RunOutcome::Cancelled => {
            if !args.json {
                println!();
                println!("Interrupted, stopping...");
                println!("Completed {} work cycles", cycles_complete);
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}
