//! Shared health state for the /health endpoint.
//! Updated by JournalWriter and YieldFeedPoller.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Shared health metrics. Updated by background tasks, read by API.
#[derive(Default)]
pub struct HealthState {
    /// Events appended to the journal since startup.
    pub journal_written: AtomicU64,
    /// Journal appends that failed.
    pub journal_errors: AtomicU64,
    /// Unix seconds of the last successful journal append (0 = none).
    pub last_journal_at: AtomicU64,
    /// True when the most recent yield feed poll succeeded.
    pub yield_feed_ok: AtomicBool,
    /// Unix seconds of the last successful yield feed poll (0 = none).
    pub last_yield_at: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_journal_write(&self, at_secs: u64) {
        self.journal_written.fetch_add(1, Ordering::Relaxed);
        self.last_journal_at.store(at_secs, Ordering::Relaxed);
    }

    pub fn inc_journal_errors(&self) {
        self.journal_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_yield_feed(&self, ok: bool, at_secs: u64) {
        self.yield_feed_ok.store(ok, Ordering::Relaxed);
        if ok {
            self.last_yield_at.store(at_secs, Ordering::Relaxed);
        }
    }

    pub fn journal_written(&self) -> u64 {
        self.journal_written.load(Ordering::Relaxed)
    }

    pub fn journal_errors(&self) -> u64 {
        self.journal_errors.load(Ordering::Relaxed)
    }

    pub fn last_journal_at(&self) -> u64 {
        self.last_journal_at.load(Ordering::Relaxed)
    }

    pub fn yield_feed_ok(&self) -> bool {
        self.yield_feed_ok.load(Ordering::Relaxed)
    }

    pub fn last_yield_at(&self) -> u64 {
        self.last_yield_at.load(Ordering::Relaxed)
    }
}
