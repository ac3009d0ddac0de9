/// Delayed commit scheduling.
///
/// Bursts of edits are coalesced into one history step: a delayed push only
/// records *when* the commit should happen, and the host loop fires it via
/// `HistoryStack::tick` once the quiet period has elapsed. Only one commit is
/// ever pending for the whole engine.
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::path::SelectionPaths;
use crate::root::RootKey;

/// Time source for deadlines.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests and scripted replays.
///
/// Clones share the same underlying time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// How long to wait before committing a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    /// Commit synchronously.
    Immediate,
    /// Use the configured default delay.
    Default,
    /// Wait this many milliseconds. Zero behaves like `Immediate`.
    Millis(u64),
}

impl Delay {
    /// Resolves to a concrete wait, or `None` for a synchronous commit.
    pub fn resolve(self, default: Duration) -> Option<Duration> {
        let wait = match self {
            Delay::Immediate => Duration::ZERO,
            Delay::Default => default,
            Delay::Millis(ms) => Duration::from_millis(ms),
        };
        (!wait.is_zero()).then_some(wait)
    }
}

impl From<bool> for Delay {
    fn from(delayed: bool) -> Self {
        if delayed {
            Delay::Default
        } else {
            Delay::Immediate
        }
    }
}

impl From<u64> for Delay {
    fn from(ms: u64) -> Self {
        Delay::Millis(ms)
    }
}

/// A commit waiting for its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
    pub root: RootKey,
    /// Region content as it was pushed. Used when the deadline passed
    /// before the host got around to firing the commit.
    pub content: String,
    pub selection: SelectionPaths,
    pub due: Instant,
}

/// Holds at most one pending commit.
#[derive(Debug, Default)]
pub struct DelayedCommitScheduler {
    pending: Option<PendingCommit>,
}

impl DelayedCommitScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a commit, replacing any pending one.
    pub fn schedule(&mut self, commit: PendingCommit) {
        if let Some(previous) = &self.pending {
            tracing::trace!("Replacing pending commit for root {}", previous.root);
        }
        self.pending = Some(commit);
    }

    /// Takes the pending commit regardless of its deadline.
    pub fn flush(&mut self) -> Option<PendingCommit> {
        self.pending.take()
    }

    /// Takes the pending commit if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<PendingCommit> {
        match &self.pending {
            Some(pending) if pending.due <= now => self.pending.take(),
            _ => None,
        }
    }

    /// Drops the pending commit without running it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending commit becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }
}
