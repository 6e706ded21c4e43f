//! Shared state: the current level and the pending buffer.
//!
//! This is the only mutable state shared between the loops. The current level
//! and the buffer sit behind separate locks, so sampling never contends with a
//! snapshot or clear. Every operation takes its lock for a bounded, purely
//! in-memory critical section and never across an `.await`.

use std::collections::VecDeque;

use levelwatch_types::{Batch, BufferedReading, Reading};
use parking_lot::{Mutex, RwLock};

/// Result of appending a reading to the pending buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appended {
    /// Sequence number assigned to the new entry.
    pub seq: u64,
    /// Oldest entry dropped to stay within capacity, if any.
    pub evicted: Option<BufferedReading>,
}

#[derive(Debug)]
struct PendingBuffer {
    entries: VecDeque<BufferedReading>,
    next_seq: u64,
    capacity: Option<usize>,
}

impl PendingBuffer {
    fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            next_seq: 1,
            capacity,
        }
    }

    fn last_seq(&self) -> u64 {
        self.next_seq - 1
    }
}

/// Race-free custody of the current level and the pending buffer.
///
/// Sequence numbers start at 1 and are never reused, even after a clear or an
/// overflow drop.
///
/// # Overflow policy
///
/// With a capacity set, appending to a full buffer drops the oldest entry
/// (drop-oldest) and reports it in [`Appended::evicted`]. Without one the
/// buffer grows for as long as transmission keeps failing.
///
/// # Example
///
/// ```rust
/// use levelwatch_sdk::SharedState;
/// use levelwatch_types::{Level, Reading};
///
/// let state = SharedState::new();
/// state.append(Reading::new(Level::new(40).unwrap(), 0));
/// state.append(Reading::new(Level::new(25).unwrap(), 1));
///
/// let batch = state.snapshot();
/// assert_eq!(batch.high_watermark, 2);
///
/// // A reading arrives while the batch is in flight
/// state.append(Reading::new(Level::new(50).unwrap(), 2));
///
/// // Clearing the confirmed batch keeps the late arrival
/// state.clear_up_to(batch.high_watermark);
/// assert_eq!(state.pending_len(), 1);
/// ```
#[derive(Debug)]
pub struct SharedState {
    current: RwLock<Option<Reading>>,
    pending: Mutex<PendingBuffer>,
}

impl SharedState {
    /// Create state with an unbounded buffer.
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// Create state with an optional buffer capacity.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            current: RwLock::new(None),
            pending: Mutex::new(PendingBuffer::new(capacity)),
        }
    }

    /// Replace the current level.
    pub fn set_current_level(&self, reading: Reading) {
        *self.current.write() = Some(reading);
    }

    /// The most recent reading, or `None` before the first sample.
    pub fn current_level(&self) -> Option<Reading> {
        *self.current.read()
    }

    /// Assign the next sequence number and append.
    pub fn append(&self, reading: Reading) -> Appended {
        let mut pending = self.pending.lock();

        let seq = pending.next_seq;
        pending.next_seq += 1;

        let evicted = match pending.capacity {
            Some(capacity) if pending.entries.len() >= capacity => pending.entries.pop_front(),
            _ => None,
        };

        pending.entries.push_back(BufferedReading { seq, reading });
        Appended { seq, evicted }
    }

    /// Copy every pending entry, in order, into a batch.
    pub fn snapshot(&self) -> Batch {
        let pending = self.pending.lock();
        Batch::from_entries(pending.entries.iter().copied().collect())
    }

    /// Remove every entry with `seq <= watermark` and return how many went.
    ///
    /// Entries appended after the snapshot that produced `watermark` have
    /// higher sequence numbers and survive.
    ///
    /// # Panics
    ///
    /// In debug builds, if `watermark` is beyond the last assigned sequence
    /// number. That can only happen if a watermark did not come from this
    /// buffer's snapshot.
    pub fn clear_up_to(&self, watermark: u64) -> usize {
        let mut pending = self.pending.lock();

        debug_assert!(
            watermark <= pending.last_seq(),
            "clear watermark {} beyond last assigned sequence {}",
            watermark,
            pending.last_seq()
        );

        let mut removed = 0;
        while pending
            .entries
            .front()
            .is_some_and(|entry| entry.seq <= watermark)
        {
            pending.entries.pop_front();
            removed += 1;
        }
        removed
    }

    /// Number of entries awaiting transmission.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().entries.len()
    }

    /// Last sequence number handed out, or 0 if nothing was ever appended.
    pub fn last_seq(&self) -> u64 {
        self.pending.lock().last_seq()
    }

    /// The configured capacity, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.pending.lock().capacity
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelwatch_types::Level;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn reading(percent: u8) -> Reading {
        Reading::new(Level::new(percent).unwrap(), 1_000)
    }

    fn levels(batch: &Batch) -> Vec<u8> {
        batch.iter().map(|e| e.reading.level.percent()).collect()
    }

    #[test]
    fn current_level_starts_unset() {
        let state = SharedState::new();
        assert!(state.current_level().is_none());

        state.set_current_level(reading(60));
        assert_eq!(state.current_level(), Some(reading(60)));
    }

    #[test]
    fn sequence_numbers_start_at_one() {
        let state = SharedState::new();
        assert_eq!(state.last_seq(), 0);
        assert_eq!(state.append(reading(1)).seq, 1);
        assert_eq!(state.append(reading(2)).seq, 2);
        assert_eq!(state.last_seq(), 2);
    }

    #[test]
    fn snapshot_then_late_append_survives_clear() {
        let state = SharedState::new();
        for percent in [40, 25, 10] {
            state.append(reading(percent));
        }

        let batch = state.snapshot();
        assert_eq!(levels(&batch), vec![40, 25, 10]);
        assert_eq!(batch.high_watermark, 3);

        // Arrives during the network round-trip
        state.append(reading(50));

        assert_eq!(state.clear_up_to(batch.high_watermark), 3);
        let remaining = state.snapshot();
        assert_eq!(levels(&remaining), vec![50]);
        assert_eq!(remaining.first_seq(), Some(4));
    }

    #[test]
    fn failed_send_leaves_buffer_intact_for_retry() {
        let state = SharedState::new();
        state.append(reading(30));
        state.append(reading(31));

        let failed = state.snapshot();
        assert_eq!(failed.len(), 2);
        // No clear on failure; more data arrives
        state.append(reading(32));

        let retry = state.snapshot();
        assert_eq!(levels(&retry), vec![30, 31, 32]);
        let seqs: Vec<u64> = retry.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(&retry.entries[..2], &failed.entries[..]);
    }

    #[test]
    fn sequence_numbers_not_reused_after_clear() {
        let state = SharedState::new();
        state.append(reading(1));
        state.append(reading(2));
        state.clear_up_to(2);
        assert_eq!(state.pending_len(), 0);

        assert_eq!(state.append(reading(3)).seq, 3);
    }

    #[test]
    fn clear_of_stale_watermark_is_noop() {
        let state = SharedState::new();
        state.append(reading(1));
        state.append(reading(2));
        state.clear_up_to(2);
        state.append(reading(3));

        assert_eq!(state.clear_up_to(2), 0);
        assert_eq!(state.pending_len(), 1);
    }

    #[test]
    fn clear_of_zero_watermark_removes_nothing() {
        let state = SharedState::new();
        state.append(reading(1));
        assert_eq!(state.clear_up_to(0), 0);
        assert_eq!(state.pending_len(), 1);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "beyond last assigned sequence")]
    fn clear_beyond_last_seq_panics_in_debug() {
        let state = SharedState::new();
        state.append(reading(1));
        state.clear_up_to(5);
    }

    #[test]
    fn capacity_drops_oldest() {
        let state = SharedState::with_capacity(Some(2));
        assert!(state.append(reading(1)).evicted.is_none());
        assert!(state.append(reading(2)).evicted.is_none());

        let appended = state.append(reading(3));
        assert_eq!(appended.seq, 3);
        assert_eq!(appended.evicted.map(|e| e.seq), Some(1));

        let batch = state.snapshot();
        assert_eq!(levels(&batch), vec![2, 3]);
        assert_eq!(state.capacity(), Some(2));
    }

    #[test]
    fn clear_after_eviction_keeps_newer_entries() {
        let state = SharedState::with_capacity(Some(2));
        state.append(reading(1));
        state.append(reading(2));
        let batch = state.snapshot();

        // Evicts seq 1 while the batch is in flight
        state.append(reading(3));

        assert_eq!(state.clear_up_to(batch.high_watermark), 1);
        assert_eq!(levels(&state.snapshot()), vec![3]);
    }

    #[test]
    fn concurrent_reads_never_observe_torn_values() {
        let state = Arc::new(SharedState::new());
        let done = Arc::new(AtomicBool::new(false));

        // Every written reading satisfies timestamp % 101 == level
        let writer = {
            let state = state.clone();
            let done = done.clone();
            thread::spawn(move || {
                for i in 0..20_000u64 {
                    let percent = (i % 101) as u8;
                    state.set_current_level(Reading::new(Level::new(percent).unwrap(), i));
                }
                done.store(true, Ordering::Release);
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let state = state.clone();
                let done = done.clone();
                thread::spawn(move || {
                    while !done.load(Ordering::Acquire) {
                        if let Some(r) = state.current_level() {
                            assert_eq!(r.timestamp_ms % 101, r.level.percent() as u64);
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn concurrent_append_and_clear_lose_nothing() {
        let state = Arc::new(SharedState::new());
        let total = 5_000u64;

        let writer = {
            let state = state.clone();
            thread::spawn(move || {
                for i in 0..total {
                    state.append(reading((i % 101) as u8));
                }
            })
        };

        let transmitter = {
            let state = state.clone();
            thread::spawn(move || {
                let mut delivered = Vec::new();
                loop {
                    let batch = state.snapshot();
                    if !batch.is_empty() {
                        delivered.extend(batch.iter().map(|e| e.seq));
                        state.clear_up_to(batch.high_watermark);
                    }
                    if state.last_seq() == total && state.pending_len() == 0 {
                        break;
                    }
                }
                delivered
            })
        };

        writer.join().unwrap();
        let delivered = transmitter.join().unwrap();

        // Every seq delivered exactly once, in order
        assert_eq!(delivered.len() as u64, total);
        assert!(delivered.windows(2).all(|w| w[0] < w[1]));
        let unique: BTreeSet<u64> = delivered.iter().copied().collect();
        assert_eq!(unique.len() as u64, total);
    }
}
