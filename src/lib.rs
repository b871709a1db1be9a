//! Pomo - A command-line pomodoro timer
//!
//! This library provides the pomodoro engine (phase state machine, timer loop
//! and clock abstraction) together with the renderers and signal wiring used
//! by the `pomo` binary.

pub mod config;
pub mod engine;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Phase, ProgressEvent, RunOutcome, Session, SessionConfig, Timer, TimerError};
pub use utils::signals::cancel_on_shutdown;
