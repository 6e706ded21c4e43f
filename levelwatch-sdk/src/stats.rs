//! Lock-free counters for what the loops have done.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::state::SharedState;

/// Running totals updated by the sampler, writer and transmitter.
#[derive(Debug, Default)]
pub struct AgentStats {
    pub samples_taken: AtomicU64,
    pub sample_failures: AtomicU64,
    pub entries_appended: AtomicU64,
    pub entries_evicted: AtomicU64,
    pub batches_sent: AtomicU64,
    pub transmit_failures: AtomicU64,
    pub entries_cleared: AtomicU64,
    pub cycles_skipped: AtomicU64,
}

impl AgentStats {
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Collect the counters together with the current buffer size.
    pub fn collect(&self, state: &SharedState) -> StatsSnapshot {
        StatsSnapshot {
            samples_taken: self.samples_taken.load(Ordering::Relaxed),
            sample_failures: self.sample_failures.load(Ordering::Relaxed),
            entries_appended: self.entries_appended.load(Ordering::Relaxed),
            entries_evicted: self.entries_evicted.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            transmit_failures: self.transmit_failures.load(Ordering::Relaxed),
            entries_cleared: self.entries_cleared.load(Ordering::Relaxed),
            cycles_skipped: self.cycles_skipped.load(Ordering::Relaxed),
            pending: state.pending_len(),
            last_seq: state.last_seq(),
        }
    }
}

/// Point-in-time copy of [`AgentStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    pub samples_taken: u64,
    pub sample_failures: u64,
    pub entries_appended: u64,
    pub entries_evicted: u64,
    pub batches_sent: u64,
    pub transmit_failures: u64,
    pub entries_cleared: u64,
    pub cycles_skipped: u64,
    pub pending: usize,
    pub last_seq: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelwatch_types::{Level, Reading};

    #[test]
    fn collect_reads_counters_and_buffer() {
        let stats = AgentStats::default();
        let state = SharedState::new();
        state.append(Reading::new(Level::new(10).unwrap(), 0));

        AgentStats::incr(&stats.samples_taken);
        AgentStats::add(&stats.entries_cleared, 4);

        let snapshot = stats.collect(&state);
        assert_eq!(snapshot.samples_taken, 1);
        assert_eq!(snapshot.entries_cleared, 4);
        assert_eq!(snapshot.pending, 1);
        assert_eq!(snapshot.last_seq, 1);
    }
}
