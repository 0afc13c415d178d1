// ─────────────────────────────────────────────────────────────────────
// Mudra — Matching Statistics
// ─────────────────────────────────────────────────────────────────────
//! Per-frame match timings and per-synthesis solver timings, shared by
//! every matcher of a session. The registry is the one cross-matcher
//! mutable aggregate, guarded by a mutex.

use parking_lot::Mutex;

/// One recorded timing: which gesture/pose, which frame, how long.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingEntry {
    pub gesture: String,
    pub pose: String,
    pub uid: u64,
    pub elapsed_ms: f64,
}

/// Thread-safe timing registry for match and synthesis calls.
#[derive(Debug, Default)]
pub struct MatchStatistics {
    match_times: Mutex<Vec<TimingEntry>>,
    synthesis_times: Mutex<Vec<TimingEntry>>,
}

impl MatchStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_match(&self, entry: TimingEntry) {
        self.match_times.lock().push(entry);
    }

    pub fn record_synthesis(&self, entry: TimingEntry) {
        self.synthesis_times.lock().push(entry);
    }

    pub fn match_count(&self) -> usize {
        self.match_times.lock().len()
    }

    pub fn synthesis_count(&self) -> usize {
        self.synthesis_times.lock().len()
    }

    pub fn total_match_ms(&self) -> f64 {
        self.match_times.lock().iter().map(|e| e.elapsed_ms).sum()
    }

    pub fn total_synthesis_ms(&self) -> f64 {
        self.synthesis_times
            .lock()
            .iter()
            .map(|e| e.elapsed_ms)
            .sum()
    }

    /// Take all recorded match timings, leaving the registry empty.
    pub fn drain_matches(&self) -> Vec<TimingEntry> {
        std::mem::take(&mut *self.match_times.lock())
    }

    pub fn drain_syntheses(&self) -> Vec<TimingEntry> {
        std::mem::take(&mut *self.synthesis_times.lock())
    }
}
