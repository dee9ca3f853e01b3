//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a map session reaches the same
//! state given the same records and the same input stream.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism the harness guards against:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Ranges are ordered sets and the roster is a `Vec`, never a map.
//!
//! - **Hidden state**: Every piece of controller state lives in
//!   [`ActionStateMachine`] and is covered by the session hash.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tactics_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of events applied per run.
    pub events: usize,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic session).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run agreed, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Session is non-deterministic!\n\
                 Runs: {}\n\
                 Events: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.events,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a session several times from the same setup and compare final hashes.
///
/// Core errors during a run count as part of the outcome: the erroring
/// event is skipped and the run continues.
pub fn verify_determinism<Setup>(runs: usize, setup: Setup, events: &[InputEvent]) -> DeterminismResult
where
    Setup: Fn() -> MapSession,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut session = setup();
        for &event in events {
            let _ = session.handle(event);
        }
        hashes.push(session.state_hash().unwrap_or_default());
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        events: events.len(),
    }
}

/// Compare two runs event by event, finding the first divergence.
///
/// # Returns
///
/// `None` if both runs agree throughout, `Some(n)` if they differ after
/// `n` events (0 means the initial states already differ).
pub fn find_first_divergence<Setup>(setup: Setup, events: &[InputEvent]) -> Option<usize>
where
    Setup: Fn() -> MapSession,
{
    let mut first = setup();
    let mut second = setup();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for (applied, &event) in events.iter().enumerate() {
        let _ = first.handle(event);
        let _ = second.handle(event);

        if first.state_hash() != second.state_hash() {
            return Some(applied + 1);
        }
    }

    None
}

/// Record `events` against one session, then play the recording back
/// against a fresh one.
///
/// # Errors
///
/// Returns the playback error if the hashes disagree.
pub fn record_and_replay<Setup>(setup: Setup, events: &[InputEvent]) -> Result<InputRecording>
where
    Setup: Fn() -> MapSession,
{
    let mut live = setup();
    let map_name = live
        .battlefield()
        .map(|field| field.grid().name().to_string())
        .unwrap_or_default();
    let mut recording = InputRecording::new(map_name);
    for &event in events {
        live.handle(event)?;
        recording.record(event);
    }
    recording.finalize(live.state_hash().unwrap_or_default());

    let bytes = recording.to_bytes()?;
    let restored = InputRecording::from_bytes(&bytes)?;
    restored.play(&mut setup())?;
    Ok(restored)
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
