//! Run-scoped high-water mark of per-record arrival counts.
//!
//! Every record created for a run holds a clone of the same tracker, so the
//! mark is shared across all records of that run and only that run. Updates
//! use an atomic `fetch_max`, which keeps the mark monotonic even when
//! records of one event are processed on different threads.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Shared maximum of `total_count` across all records of one run.
#[derive(Debug, Clone, Default)]
pub struct PeakTracker {
    peak: Arc<AtomicU32>,
}

impl PeakTracker {
    /// Creates a tracker with a mark of zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mark.
    #[inline]
    #[must_use]
    pub fn get(&self) -> u32 {
        self.peak.load(Ordering::Relaxed)
    }

    /// Raises the mark to `count` if it is higher. Returns the new mark.
    #[inline]
    pub fn observe(&self, count: u32) -> u32 {
        self.peak.fetch_max(count, Ordering::Relaxed).max(count)
    }

    /// Overwrites the mark, typically with zero at the start of a run.
    pub fn reset(&self, value: u32) {
        self.peak.store(value, Ordering::Relaxed);
    }

    /// True if both handles point at the same run's mark.
    #[must_use]
    pub fn same_run(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.peak, &other.peak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_is_monotonic() {
        let peak = PeakTracker::new();
        assert_eq!(peak.observe(3), 3);
        assert_eq!(peak.observe(1), 3);
        assert_eq!(peak.observe(7), 7);
        assert_eq!(peak.get(), 7);
    }

    #[test]
    fn test_clones_share_mark() {
        let a = PeakTracker::new();
        let b = a.clone();
        b.observe(12);
        assert_eq!(a.get(), 12);
        assert!(a.same_run(&b));
    }

    #[test]
    fn test_separate_runs_do_not_interfere() {
        let a = PeakTracker::new();
        let b = PeakTracker::new();
        a.observe(5);
        assert_eq!(b.get(), 0);
        assert!(!a.same_run(&b));
    }

    #[test]
    fn test_reset() {
        let peak = PeakTracker::new();
        peak.observe(9);
        peak.reset(0);
        assert_eq!(peak.get(), 0);
    }

    #[test]
    fn test_concurrent_observe() {
        let peak = PeakTracker::new();
        std::thread::scope(|s| {
            for n in 0..8u32 {
                let peak = peak.clone();
                s.spawn(move || {
                    for i in 0..100 {
                        peak.observe(n * 100 + i);
                    }
                });
            }
        });
        assert_eq!(peak.get(), 799);
    }
}
