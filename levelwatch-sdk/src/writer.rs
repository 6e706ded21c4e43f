//! Buffer writer: appends the current level to the pending buffer.
//!
//! Every tick appends a new entry, even if the level has not changed since
//! the last one. Repeated values are the trend, not duplicates.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::schedule::Activity;
use crate::state::{Appended, SharedState};
use crate::stats::AgentStats;

#[derive(Debug)]
pub(crate) struct BufferWriter {
    state: Arc<SharedState>,
    stats: Arc<AgentStats>,
}

impl BufferWriter {
    pub(crate) fn new(state: Arc<SharedState>, stats: Arc<AgentStats>) -> Self {
        Self { state, stats }
    }

    /// Append the current level, or do nothing before the first sample.
    pub(crate) fn write_once(&self) -> Option<Appended> {
        let Some(reading) = self.state.current_level() else {
            info!(activity = Self::NAME, "no level sampled yet, skipping");
            return None;
        };

        let appended = self.state.append(reading);
        AgentStats::incr(&self.stats.entries_appended);

        if let Some(evicted) = appended.evicted {
            AgentStats::incr(&self.stats.entries_evicted);
            warn!(
                activity = Self::NAME,
                "buffer full, dropped oldest entry #{}", evicted.seq
            );
        }

        info!(
            activity = Self::NAME,
            "buffered {} as #{} ({} pending)",
            reading.level,
            appended.seq,
            self.state.pending_len()
        );
        Some(appended)
    }
}

#[async_trait]
impl Activity for BufferWriter {
    const NAME: &'static str = "writer";

    async fn tick(&mut self) {
        self.write_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_log::CapturedEvents;
    use levelwatch_types::{Level, Reading};
    use std::sync::atomic::Ordering;

    fn writer(capacity: Option<usize>) -> BufferWriter {
        BufferWriter::new(
            Arc::new(SharedState::with_capacity(capacity)),
            Arc::new(AgentStats::default()),
        )
    }

    #[test]
    fn skips_until_first_sample() {
        let writer = writer(None);
        assert!(writer.write_once().is_none());
        assert_eq!(writer.state.pending_len(), 0);
    }

    #[test]
    fn skipped_iteration_reports_at_info() {
        let (captured, _guard) = CapturedEvents::install();
        writer(None).write_once();

        let events = captured.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, tracing::Level::INFO);
        assert!(events[0].1.contains("no level sampled yet"));
    }

    #[test]
    fn appends_same_level_every_tick() {
        let writer = writer(None);
        writer
            .state
            .set_current_level(Reading::new(Level::new(70).unwrap(), 5));

        assert_eq!(writer.write_once().unwrap().seq, 1);
        assert_eq!(writer.write_once().unwrap().seq, 2);

        let batch = writer.state.snapshot();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|e| e.reading.level.percent() == 70));
        assert_eq!(writer.stats.entries_appended.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn counts_evictions() {
        let writer = writer(Some(1));
        writer
            .state
            .set_current_level(Reading::new(Level::new(10).unwrap(), 0));

        writer.write_once();
        let second = writer.write_once().unwrap();
        assert_eq!(second.evicted.map(|e| e.seq), Some(1));
        assert_eq!(writer.stats.entries_evicted.load(Ordering::Relaxed), 1);
    }
}
