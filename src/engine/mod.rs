//! Pomodoro engine
//!
//! This module contains the phase state machine, the timer loop that drives it
//! and the clock abstraction the loop reads time from.

pub mod clock;
pub mod session;
pub mod timer;

// Re-export main types
pub use clock::{Clock, RealClock, Ticker, VirtualClock};
pub use session::{Phase, Session, SessionConfig};
pub use timer::{ProgressEvent, RunOutcome, Timer, TimerError, DEFAULT_TICK_INTERVAL};
