//! Utility functions module
//!
//! This module contains utility functions used by the command-line front end.

pub mod signals;

// Re-export main functions
pub use signals::{cancel_on_shutdown, shutdown_signal};
