//! Time sources for the timer loop
//!
//! The timer never reads the system clock directly. It asks a [`Clock`] for the
//! current instant and for a repeating [`Ticker`], which lets tests swap in a
//! [`VirtualClock`] and move time forward by hand.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::{Duration, Instant},
};
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::trace;

/// Source of time and periodic wake-ups
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;

    /// Create a ticker firing every `interval`. The interval must be non-zero.
    fn new_ticker(&self, interval: Duration) -> Ticker;

    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// Repeating tick source handed out by a [`Clock`]
///
/// Holds at most one pending tick. A tick that arrives while the previous one
/// is still unconsumed is dropped.
pub struct Ticker {
    rx: mpsc::Receiver<Instant>,
    stop: StopHandle,
}

enum StopHandle {
    Task(JoinHandle<()>),
    Flag(Arc<AtomicBool>),
}

impl Ticker {
    /// Wait for the next tick. A stopped ticker never resolves.
    pub async fn tick(&mut self) -> Instant {
        match self.rx.recv().await {
            Some(at) => at,
            None => std::future::pending().await,
        }
    }

    /// Take the pending tick, if any, without waiting
    pub fn try_tick(&mut self) -> Option<Instant> {
        self.rx.try_recv().ok()
    }

    /// Stop producing ticks
    pub fn stop(&mut self) {
        match &self.stop {
            StopHandle::Task(handle) => handle.abort(),
            StopHandle::Flag(stopped) => stopped.store(true, Ordering::SeqCst),
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wall clock backed by the monotonic system clock and tokio intervals
///
/// [`Clock::new_ticker`] spawns a task, so it must be called from within a
/// tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn new_ticker(&self, interval: Duration) -> Ticker {
        let (tx, rx) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            let first = tokio::time::Instant::now() + interval;
            let mut ticks = tokio::time::interval_at(first, interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let at = ticks.tick().await;
                match tx.try_send(at.into_std()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        trace!("Dropping tick, previous one not consumed")
                    }
                    Err(TrySendError::Closed(_)) => break,
                }
            }
        });

        Ticker {
            rx,
            stop: StopHandle::Task(handle),
        }
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Manually driven clock for deterministic tests
///
/// Time only moves when [`VirtualClock::advance`] (or [`Clock::sleep`]) is
/// called. Clones share the same timeline, so a test can keep one handle while
/// the timer owns another.
#[derive(Clone)]
pub struct VirtualClock {
    inner: Arc<Mutex<VirtualState>>,
}

struct VirtualState {
    current: Instant,
    tickers: Vec<VirtualTicker>,
}

struct VirtualTicker {
    interval: Duration,
    next_tick: Instant,
    tx: mpsc::Sender<Instant>,
    stopped: Arc<AtomicBool>,
}

impl VirtualTicker {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst) || self.tx.is_closed()
    }
}

impl VirtualClock {
    /// Create a virtual clock whose timeline starts at `start`
    pub fn new(start: Instant) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VirtualState {
                current: start,
                tickers: Vec::new(),
            })),
        }
    }

    /// Move time forward by `duration`, firing due tickers one at a time in
    /// chronological order
    pub fn advance(&self, duration: Duration) {
        let mut state = self.lock();
        let target = state.current + duration;

        loop {
            state.tickers.retain(|t| !t.is_stopped());

            // min_by_key keeps the earliest registered ticker on ties
            let due = state
                .tickers
                .iter_mut()
                .min_by_key(|t| t.next_tick)
                .filter(|t| t.next_tick <= target);

            let Some(ticker) = due else {
                break;
            };

            let at = ticker.next_tick;
            if ticker.tx.try_send(at).is_err() {
                trace!("Virtual tick dropped, previous one not consumed");
            }
            ticker.next_tick += ticker.interval;
            state.current = at;
        }

        state.current = target;
    }

    /// Number of tickers that are still running
    pub fn active_tickers(&self) -> usize {
        self.lock().tickers.iter().filter(|t| !t.is_stopped()).count()
    }

    fn lock(&self) -> MutexGuard<'_, VirtualState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.lock().current
    }

    fn new_ticker(&self, interval: Duration) -> Ticker {
        debug_assert!(!interval.is_zero(), "ticker interval must be non-zero");

        let (tx, rx) = mpsc::channel(1);
        let stopped = Arc::new(AtomicBool::new(false));

        let mut state = self.lock();
        let next_tick = state.current + interval;
        state.tickers.push(VirtualTicker {
            interval,
            next_tick,
            tx,
            stopped: Arc::clone(&stopped),
        });

        Ticker {
            rx,
            stop: StopHandle::Flag(stopped),
        }
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
