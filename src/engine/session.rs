//! Pomodoro phase state machine

use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use tracing::debug;

/// Phase of a pomodoro session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
    /// Terminal phase, nothing follows it
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Work => "Work",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
            Phase::Done => "Done",
        };
        f.write_str(name)
    }
}

/// Session configuration, fixed once the session is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub work_duration: Duration,
    pub short_break_duration: Duration,
    pub long_break_duration: Duration,
    /// Every Nth completed work cycle is followed by a long break (0 = never)
    pub long_break_every: u32,
    /// Work cycles to run before the session is done (0 = unbounded)
    pub total_cycles: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_duration: Duration::from_secs(50 * 60),
            short_break_duration: Duration::from_secs(10 * 60),
            long_break_duration: Duration::from_secs(30 * 60),
            long_break_every: 4,
            total_cycles: 0,
        }
    }
}

/// Progression through the phases of one session
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    current_phase: Phase,
    cycles_complete: u32,
    phases_complete: u32,
    total_phases: u32,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            current_phase: Phase::Work,
            cycles_complete: 0,
            phases_complete: 0,
            total_phases: total_phases(&config),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_phase(&self) -> Phase {
        self.current_phase
    }

    /// Completed work cycles
    pub fn cycles_complete(&self) -> u32 {
        self.cycles_complete
    }

    pub fn total_cycles(&self) -> u32 {
        self.config.total_cycles
    }

    /// Completed phases of any kind
    pub fn phases_complete(&self) -> u32 {
        self.phases_complete
    }

    /// Phases in the whole session, 0 when the session is unbounded
    pub fn total_phases(&self) -> u32 {
        self.total_phases
    }

    pub fn is_done(&self) -> bool {
        self.current_phase == Phase::Done
    }

    /// Configured length of the current phase, zero once done
    pub fn phase_duration(&self) -> Duration {
        match self.current_phase {
            Phase::Work => self.config.work_duration,
            Phase::ShortBreak => self.config.short_break_duration,
            Phase::LongBreak => self.config.long_break_duration,
            Phase::Done => Duration::ZERO,
        }
    }

    /// Complete the current phase and move to the next one
    ///
    /// Calling this once the session is done changes nothing.
    pub fn next_phase(&mut self) -> Phase {
        if self.current_phase == Phase::Done {
            return Phase::Done;
        }

        self.phases_complete = self.phases_complete.saturating_add(1);

        self.current_phase = match self.current_phase {
            Phase::Work => {
                self.cycles_complete = self.cycles_complete.saturating_add(1);

                let bounded = self.config.total_cycles > 0;
                if bounded && self.cycles_complete >= self.config.total_cycles {
                    Phase::Done
                } else if self.config.long_break_every > 0
                    && self.cycles_complete % self.config.long_break_every == 0
                {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
            Phase::Done => Phase::Done,
        };

        debug!(
            "Advanced to {} (cycles {}, phases {})",
            self.current_phase, self.cycles_complete, self.phases_complete
        );

        self.current_phase
    }
}

/// Work cycles plus the breaks between them, 0 for an unbounded session
///
/// Saturates at `u32::MAX` for cycle counts above `u32::MAX / 2 + 1`.
fn total_phases(config: &SessionConfig) -> u32 {
    let cycles = config.total_cycles;
    if cycles == 0 {
        return 0;
    }

    let breaks = cycles - 1;
    let long_breaks = match config.long_break_every {
        0 => 0,
        every => breaks / every,
    };
    let short_breaks = breaks - long_breaks;

    cycles.saturating_add(long_breaks + short_breaks)
}
