//! Timer loop driving a session through its phases

use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use super::{
    clock::{Clock, RealClock},
    session::{Phase, Session, SessionConfig},
};

/// Rate at which progress events are emitted
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Tokio intervals reject a zero period
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Snapshot of the running phase at one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub elapsed: Duration,
    /// Never negative, saturates at zero
    pub remaining: Duration,
    pub total: Duration,
    /// Completion ratio clamped to `[0.0, 1.0]`
    pub fraction: f64,
    /// Set on the last event of a phase
    pub phase_complete: bool,
    /// 1-based work cycle number
    pub cycle_num: u32,
    pub total_cycles: u32,
    /// 1-based phase ordinal
    pub phase_num: u32,
    pub total_phases: u32,
}

/// How a run ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every phase ran and the session reached [`Phase::Done`]
    Completed,
    /// The cancellation token fired before the session finished
    Cancelled,
}

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("progress event receiver was dropped before the session finished")]
    ConsumerClosed,
}

enum PhaseEnd {
    Finished,
    Cancelled,
}

/// Runs one pomodoro session, emitting a [`ProgressEvent`] on every tick
pub struct Timer {
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    session: Session,
}

impl Timer {
    /// Create a timer on the system clock with the default tick interval
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, Arc::new(RealClock), DEFAULT_TICK_INTERVAL)
    }

    /// Create a timer on a custom clock
    pub fn with_clock(
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            clock,
            tick_interval: tick_interval.max(MIN_TICK_INTERVAL),
            session: Session::new(config),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Run the whole session, sending events into `events`
    ///
    /// The sender is dropped on return, which closes the stream for the
    /// consumer. Cancellation is reported as [`RunOutcome::Cancelled`], not as
    /// an error. The consumer has to keep receiving until the stream closes,
    /// otherwise the timer waits on the send forever.
    ///
    /// Dropping the receiver is different: tokio fails the send at once, so
    /// instead of stalling the run ends with [`TimerError::ConsumerClosed`].
    pub async fn run(
        &mut self,
        cancel: &CancellationToken,
        events: mpsc::Sender<ProgressEvent>,
    ) -> Result<RunOutcome, TimerError> {
        info!(
            "Starting session: {} cycles, {} phases, tick every {:?}",
            self.session.total_cycles(),
            self.session.total_phases(),
            self.tick_interval
        );

        while !self.session.is_done() {
            if cancel.is_cancelled() {
                info!("Session cancelled before {}", self.session.current_phase());
                return Ok(RunOutcome::Cancelled);
            }

            let duration = self.session.phase_duration();
            if duration.is_zero() {
                debug!("Skipping zero-length {} phase", self.session.current_phase());
                self.session.next_phase();
                tokio::task::yield_now().await;
                continue;
            }

            match self.run_phase(duration, cancel, &events).await? {
                PhaseEnd::Finished => {
                    info!(
                        "{} phase finished ({}/{} phases)",
                        self.session.current_phase(),
                        self.session.phases_complete().saturating_add(1),
                        self.session.total_phases()
                    );
                    self.session.next_phase();
                }
                PhaseEnd::Cancelled => {
                    info!("Session cancelled during {}", self.session.current_phase());
                    return Ok(RunOutcome::Cancelled);
                }
            }
        }

        info!(
            "Session complete after {} cycles",
            self.session.cycles_complete()
        );
        Ok(RunOutcome::Completed)
    }

    async fn run_phase(
        &self,
        duration: Duration,
        cancel: &CancellationToken,
        events: &mpsc::Sender<ProgressEvent>,
    ) -> Result<PhaseEnd, TimerError> {
        debug!("Starting {} phase for {:?}", self.session.current_phase(), duration);

        let start = self.clock.now();
        let mut ticker = self.clock.new_ticker(self.tick_interval);

        loop {
            let event = self.progress_event(start, duration);
            trace!("Emitting {:?}", event);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(PhaseEnd::Cancelled),
                sent = events.send(event) => sent.map_err(|_| TimerError::ConsumerClosed)?,
            }

            if event.phase_complete {
                ticker.stop();
                return Ok(PhaseEnd::Finished);
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(PhaseEnd::Cancelled),
                _ = ticker.tick() => {}
            }
        }
    }

    fn progress_event(&self, start: Instant, duration: Duration) -> ProgressEvent {
        let elapsed = self.clock.now().saturating_duration_since(start);
        let fraction = (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0);

        ProgressEvent {
            phase: self.session.current_phase(),
            elapsed,
            remaining: duration.saturating_sub(elapsed),
            total: duration,
            fraction,
            phase_complete: elapsed >= duration,
            cycle_num: self.session.cycles_complete().saturating_add(1),
            total_cycles: self.session.total_cycles(),
            phase_num: self.session.phases_complete().saturating_add(1),
            total_phases: self.session.total_phases(),
        }
    }
}
