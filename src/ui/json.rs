//! JSON-lines event output

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use super::Renderer;
use crate::engine::{Phase, ProgressEvent};

/// Serialisable form of a [`ProgressEvent`], stamped with wall-clock time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub at: DateTime<Utc>,
    pub phase: Phase,
    pub elapsed_ms: u64,
    pub remaining_ms: u64,
    pub total_ms: u64,
    pub fraction: f64,
    pub phase_complete: bool,
    pub cycle: u32,
    pub total_cycles: u32,
    pub phase_num: u32,
    pub total_phases: u32,
}

impl EventRecord {
    pub fn new(event: &ProgressEvent, at: DateTime<Utc>) -> Self {
        Self {
            at,
            phase: event.phase,
            elapsed_ms: millis(event.elapsed),
            remaining_ms: millis(event.remaining),
            total_ms: millis(event.total),
            fraction: event.fraction,
            phase_complete: event.phase_complete,
            cycle: event.cycle_num,
            total_cycles: event.total_cycles,
            phase_num: event.phase_num,
            total_phases: event.total_phases,
        }
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Writes one JSON object per event
pub struct JsonLines<W: Write> {
    out: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonLines<W> {
    fn update(&mut self, event: &ProgressEvent) -> io::Result<()> {
        let record = EventRecord::new(event, Utc::now());
        serde_json::to_writer(&mut self.out, &record)?;
        writeln!(self.out)?;
        self.out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
