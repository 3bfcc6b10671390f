use crate::core::system_info::types::IoCounters;
use parking_lot::Mutex;

/// Baseline subtracted from the live network counters.
///
/// Starts at zero, so the first reads report the raw cumulative values.
#[derive(Debug, Default)]
pub struct IoCounterOffsetStore {
    offset: Mutex<IoCounters>,
}

impl IoCounterOffsetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the baseline with `live`.
    pub fn reset(&self, live: IoCounters) {
        *self.offset.lock() = live;
        log::info!(
            "I/O counters reset (sent={} recv={})",
            live.bytes_sent,
            live.bytes_recv
        );
    }

    pub fn apply(&self, live: IoCounters) -> IoCounters {
        live.saturating_sub(&self.offset.lock())
    }

    pub fn offset(&self) -> IoCounters {
        *self.offset.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn counters(n: u64) -> IoCounters {
        IoCounters {
            bytes_sent: n,
            bytes_recv: n * 2,
            packets_sent: n / 10,
            packets_recv: n / 5,
            errin: 0,
            errout: 1,
        }
    }

    #[test]
    fn test_initial_offset_is_zero() {
        let store = IoCounterOffsetStore::new();
        assert_eq!(store.apply(counters(1000)), counters(1000));
    }

    #[test]
    fn test_reset_then_apply_reports_delta() {
        let store = IoCounterOffsetStore::new();
        store.reset(counters(1000));

        assert_eq!(store.apply(counters(1000)), IoCounters::default());

        let delta = store.apply(counters(1500));
        assert_eq!(delta.bytes_sent, 500);
        assert_eq!(delta.bytes_recv, 1000);
        assert_eq!(delta.packets_sent, 50);
    }

    #[test]
    fn test_counter_wrap_saturates_at_zero() {
        let store = IoCounterOffsetStore::new();
        store.reset(counters(1000));

        // Interface reset: live counters restart below the baseline.
        assert_eq!(store.apply(counters(10)), IoCounters::default());
    }

    #[test]
    fn test_concurrent_resets_leave_one_baseline() {
        let store = Arc::new(IoCounterOffsetStore::new());
        let handles: Vec<_> = (1..=8u64)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.reset(counters(i * 100)))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let offset = store.offset();
        assert!((1..=8u64).any(|i| offset == counters(i * 100)));
    }
}
