//! Signal handling for cancelling a running session

use futures::stream::StreamExt;
use signal_hook_tokio::Signals;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Wait for shutdown signals (SIGTERM, SIGINT)
pub async fn shutdown_signal() -> std::io::Result<()> {
    let mut signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ])?;

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
    Ok(())
}

/// Cancel `token` on the first shutdown signal
///
/// The listener exits on its own once the token is cancelled by anyone else.
pub fn cancel_on_shutdown(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            result = shutdown_signal() => {
                if let Err(e) = result {
                    warn!("Failed to install signal handler: {}", e);
                    return;
                }
                token.cancel();
            }
        }
    })
}
