//! Transmitter: sends everything pending and clears only what was confirmed.
//!
//! Each cycle:
//!
//! 1. snapshot the pending buffer (under the buffer lock)
//! 2. send the snapshot with no lock held, bounded by a timeout
//! 3. on success, clear up to the snapshot's high-water mark (lock again)
//! 4. on failure, leave the buffer alone so the next cycle retries
//!
//! Entries appended during step 2 have sequence numbers above the watermark
//! and are never cleared by step 3.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use levelwatch_types::{current_timestamp_ms, BatchPayload, Thresholds};
use tracing::{info, warn};

use crate::error::TransmitError;
use crate::schedule::Activity;
use crate::state::SharedState;
use crate::stats::AgentStats;
use crate::transport::Transport;

/// What a single transmission cycle did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Nothing was pending; no network call was made.
    Skipped,
    /// The batch was confirmed and cleared.
    Sent {
        /// Entries in the batch.
        entries: usize,
        /// High-water mark that was cleared up to.
        high_watermark: u64,
        /// Entries actually removed (fewer than `entries` if some were
        /// evicted by the overflow policy in the meantime).
        cleared: usize,
    },
    /// The send failed or timed out; the buffer is unchanged.
    Failed(TransmitError),
}

impl CycleOutcome {
    /// Check if the cycle delivered a batch.
    pub fn is_sent(&self) -> bool {
        matches!(self, CycleOutcome::Sent { .. })
    }
}

#[derive(Debug)]
pub(crate) struct Transmitter {
    transport: Box<dyn Transport>,
    state: Arc<SharedState>,
    stats: Arc<AgentStats>,
    thresholds: Thresholds,
    agent_id: String,
    timeout: Duration,
}

impl Transmitter {
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        state: Arc<SharedState>,
        stats: Arc<AgentStats>,
        thresholds: Thresholds,
        agent_id: String,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            state,
            stats,
            thresholds,
            agent_id,
            timeout,
        }
    }

    pub(crate) async fn run_cycle(&mut self) -> CycleOutcome {
        let batch = self.state.snapshot();
        if batch.is_empty() {
            AgentStats::incr(&self.stats.cycles_skipped);
            return CycleOutcome::Skipped;
        }

        let payload = BatchPayload::from_batch(
            &batch,
            self.agent_id.as_str(),
            &self.thresholds,
            current_timestamp_ms(),
        );

        let result = match tokio::time::timeout(self.timeout, self.transport.transmit(&payload))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(TransmitError::Timeout(self.timeout)),
        };

        match result {
            Ok(()) => {
                let cleared = self.state.clear_up_to(batch.high_watermark);
                AgentStats::incr(&self.stats.batches_sent);
                AgentStats::add(&self.stats.entries_cleared, cleared as u64);
                CycleOutcome::Sent {
                    entries: batch.len(),
                    high_watermark: batch.high_watermark,
                    cleared,
                }
            }
            Err(e) => {
                AgentStats::incr(&self.stats.transmit_failures);
                CycleOutcome::Failed(e)
            }
        }
    }

    pub(crate) fn description(&self) -> &str {
        self.transport.description()
    }
}

#[async_trait]
impl Activity for Transmitter {
    const NAME: &'static str = "transmitter";

    async fn tick(&mut self) {
        match self.run_cycle().await {
            CycleOutcome::Skipped => {
                info!(activity = Self::NAME, "nothing pending, skipping send");
            }
            CycleOutcome::Sent {
                entries,
                high_watermark,
                ..
            } => {
                info!(
                    activity = Self::NAME,
                    "sent {} readings up to #{} via {} ({} still pending)",
                    entries,
                    high_watermark,
                    self.transport.description(),
                    self.state.pending_len()
                );
            }
            CycleOutcome::Failed(e) => {
                warn!(
                    activity = Self::NAME,
                    "send failed, keeping {} readings for retry: {}",
                    self.state.pending_len(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::test_log::CapturedEvents;
    use levelwatch_types::{Level, Reading};
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Transport that records payloads and replays scripted results.
    /// An exhausted script means success.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct RecordingTransport {
        pub(crate) sent: Arc<Mutex<Vec<BatchPayload>>>,
        pub(crate) delivered: Arc<Mutex<Vec<BatchPayload>>>,
        script: Arc<Mutex<VecDeque<bool>>>,
        /// Appended to state between receiving and answering, simulating
        /// data that arrives during the round-trip.
        during_send: Option<(Arc<SharedState>, u8)>,
    }

    impl RecordingTransport {
        pub(crate) fn with_script(script: impl IntoIterator<Item = bool>) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into_iter().collect())),
                ..Default::default()
            }
        }

        fn append_during_send(mut self, state: Arc<SharedState>, percent: u8) -> Self {
            self.during_send = Some((state, percent));
            self
        }

        pub(crate) fn sent_seqs(&self) -> Vec<Vec<u64>> {
            seqs(&self.sent.lock())
        }

        pub(crate) fn delivered_seqs(&self) -> Vec<u64> {
            seqs(&self.delivered.lock()).into_iter().flatten().collect()
        }
    }

    fn seqs(payloads: &[BatchPayload]) -> Vec<Vec<u64>> {
        payloads
            .iter()
            .map(|p| p.entries.iter().map(|e| e.seq).collect())
            .collect()
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn transmit(&mut self, payload: &BatchPayload) -> Result<(), TransmitError> {
            self.sent.lock().push(payload.clone());
            if let Some((state, percent)) = self.during_send.take() {
                state.append(Reading::new(Level::new(percent).unwrap(), 0));
            }
            let succeed = self.script.lock().pop_front().unwrap_or(true);
            if succeed {
                self.delivered.lock().push(payload.clone());
                Ok(())
            } else {
                Err(TransmitError::Rejected("scripted failure".to_string()))
            }
        }

        fn description(&self) -> &str {
            "recording"
        }
    }

    /// Transport whose round-trip never completes.
    #[derive(Debug)]
    pub(crate) struct HangingTransport;

    #[async_trait]
    impl Transport for HangingTransport {
        async fn transmit(&mut self, _payload: &BatchPayload) -> Result<(), TransmitError> {
            std::future::pending().await
        }

        fn description(&self) -> &str {
            "hanging"
        }
    }

    fn transmitter(state: Arc<SharedState>, transport: impl Transport + 'static) -> Transmitter {
        Transmitter::new(
            Box::new(transport),
            state,
            Arc::new(AgentStats::default()),
            Thresholds::default(),
            "test-agent".to_string(),
            Duration::from_secs(5),
        )
    }

    fn append_levels(state: &SharedState, levels: &[u8]) {
        for &percent in levels {
            state.append(Reading::new(Level::new(percent).unwrap(), 0));
        }
    }

    fn pending_levels(state: &SharedState) -> Vec<u8> {
        state
            .snapshot()
            .iter()
            .map(|e| e.reading.level.percent())
            .collect()
    }

    #[tokio::test]
    async fn empty_buffer_skips_network() {
        let state = Arc::new(SharedState::new());
        let transport = RecordingTransport::default();
        let mut tx = transmitter(state, transport.clone());

        assert!(matches!(tx.run_cycle().await, CycleOutcome::Skipped));
        assert!(transport.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn skipped_cycle_reports_at_info() {
        let state = Arc::new(SharedState::new());
        let mut tx = transmitter(state, RecordingTransport::default());

        let (captured, _guard) = CapturedEvents::install();
        tx.tick().await;

        let events = captured.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, tracing::Level::INFO);
        assert!(events[0].1.contains("nothing pending"));
    }

    #[tokio::test]
    async fn success_keeps_entries_appended_during_send() {
        let state = Arc::new(SharedState::new());
        append_levels(&state, &[40, 25, 10]);

        let transport = RecordingTransport::default().append_during_send(state.clone(), 50);
        let mut tx = transmitter(state.clone(), transport.clone());

        match tx.run_cycle().await {
            CycleOutcome::Sent {
                entries,
                high_watermark,
                cleared,
            } => {
                assert_eq!(entries, 3);
                assert_eq!(high_watermark, 3);
                assert_eq!(cleared, 3);
            }
            other => panic!("expected Sent, got {:?}", other),
        }

        assert_eq!(transport.sent_seqs(), vec![vec![1, 2, 3]]);
        assert_eq!(pending_levels(&state), vec![50]);
    }

    #[tokio::test]
    async fn failure_then_retry_resends_in_order() {
        let state = Arc::new(SharedState::new());
        append_levels(&state, &[30, 31]);

        let transport = RecordingTransport::with_script([false, true]);
        let mut tx = transmitter(state.clone(), transport.clone());

        assert!(matches!(tx.run_cycle().await, CycleOutcome::Failed(_)));
        assert_eq!(pending_levels(&state), vec![30, 31]);

        append_levels(&state, &[32]);
        assert!(tx.run_cycle().await.is_sent());

        assert_eq!(transport.sent_seqs(), vec![vec![1, 2], vec![1, 2, 3]]);
        assert_eq!(state.pending_len(), 0);
    }

    #[tokio::test]
    async fn payload_carries_agent_id_and_status() {
        let state = Arc::new(SharedState::new());
        append_levels(&state, &[19]);

        let transport = RecordingTransport::default();
        let mut tx = transmitter(state, transport.clone());
        tx.run_cycle().await;

        let sent = transport.sent.lock();
        assert_eq!(sent[0].agent_id, "test-agent");
        assert_eq!(
            sent[0].entries[0].status,
            levelwatch_types::Status::Critical
        );
    }

    #[tokio::test(start_paused = true)]
    async fn hung_transport_times_out_without_clearing() {
        let state = Arc::new(SharedState::new());
        append_levels(&state, &[80, 81]);

        let mut tx = transmitter(state.clone(), HangingTransport);

        match tx.run_cycle().await {
            CycleOutcome::Failed(TransmitError::Timeout(d)) => {
                assert_eq!(d, Duration::from_secs(5))
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(pending_levels(&state), vec![80, 81]);
    }
}
