//! Output renderers
//!
//! Each renderer consumes progress events in the order they were emitted and
//! writes them to a terminal or any other writer.

pub mod json;
pub mod progress;

use std::io;

use crate::engine::ProgressEvent;

pub use json::{EventRecord, JsonLines};
pub use progress::{format_duration, Progress};

/// Sink for progress events
pub trait Renderer {
    /// Render one event
    fn update(&mut self, event: &ProgressEvent) -> io::Result<()>;

    /// Flush and close any partially drawn output
    fn finish(&mut self) -> io::Result<()>;
}
