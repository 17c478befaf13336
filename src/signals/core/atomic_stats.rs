/*!
 * Lock-Free Mailbox Statistics
 * Counters bumped from handler context, read from ordinary code
 */

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mailbox statistics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MailboxStats {
    pub payloads_published: usize,
    pub deliveries_rejected: usize,
    pub deferral_failures: usize,
    pub notices_recorded: usize,
    pub interrupts_recorded: usize,
    pub signals_recorded: usize,
    pub children_reaped: usize,
}

/// Atomic mailbox statistics
///
/// # Handler safety
/// Every `record_*` method is a single relaxed `fetch_add` on a lock-free
/// word-sized atomic: no allocation, no locks, safe inside a signal handler.
#[repr(C, align(64))]
pub struct AtomicMailboxStats {
    payloads_published: AtomicUsize,
    deliveries_rejected: AtomicUsize,
    deferral_failures: AtomicUsize,
    notices_recorded: AtomicUsize,
    interrupts_recorded: AtomicUsize,
    signals_recorded: AtomicUsize,
    children_reaped: AtomicUsize,
}

impl AtomicMailboxStats {
    pub const fn new() -> Self {
        Self {
            payloads_published: AtomicUsize::new(0),
            deliveries_rejected: AtomicUsize::new(0),
            deferral_failures: AtomicUsize::new(0),
            notices_recorded: AtomicUsize::new(0),
            interrupts_recorded: AtomicUsize::new(0),
            signals_recorded: AtomicUsize::new(0),
            children_reaped: AtomicUsize::new(0),
        }
    }

    #[inline(always)]
    pub(crate) fn record_published(&self) {
        self.payloads_published.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn record_rejected(&self) {
        self.deliveries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn record_deferral_failure(&self) {
        self.deferral_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn record_notice(&self) {
        self.notices_recorded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn record_interrupt(&self) {
        self.interrupts_recorded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn record_signal(&self) {
        self.signals_recorded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn record_reaped(&self) {
        self.children_reaped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current stats
    ///
    /// # Note
    /// Each counter is read independently; a handler may fire between two loads.
    pub fn snapshot(&self) -> MailboxStats {
        MailboxStats {
            payloads_published: self.payloads_published.load(Ordering::Relaxed),
            deliveries_rejected: self.deliveries_rejected.load(Ordering::Relaxed),
            deferral_failures: self.deferral_failures.load(Ordering::Relaxed),
            notices_recorded: self.notices_recorded.load(Ordering::Relaxed),
            interrupts_recorded: self.interrupts_recorded.load(Ordering::Relaxed),
            signals_recorded: self.signals_recorded.load(Ordering::Relaxed),
            children_reaped: self.children_reaped.load(Ordering::Relaxed),
        }
    }
}

impl Default for AtomicMailboxStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_independent() {
        let stats = AtomicMailboxStats::new();
        stats.record_published();
        stats.record_published();
        stats.record_rejected();
        stats.record_reaped();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.payloads_published, 2);
        assert_eq!(snapshot.deliveries_rejected, 1);
        assert_eq!(snapshot.children_reaped, 1);
        assert_eq!(snapshot.notices_recorded, 0);
    }
}
