//! Input recordings for deterministic playback.
//!
//! A recording stores the stream of input events applied to one map and the
//! session hash reached at the end. Playing the events back against a fresh
//! session built from the same records must reach the same hash.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TacticsError};
use crate::input::InputEvent;
use crate::session::MapSession;

/// Recording file format version.
pub const RECORDING_VERSION: u32 = 1;

/// A recorded input stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecording {
    /// Format version.
    pub version: u32,
    /// Display name of the map the events were applied to.
    pub map_name: String,
    /// Events in the order they were handled.
    pub events: Vec<InputEvent>,
    /// Session hash after the last event.
    pub final_hash: u64,
}

impl InputRecording {
    /// Start an empty recording for a map.
    #[must_use]
    pub fn new(map_name: impl Into<String>) -> Self {
        Self {
            version: RECORDING_VERSION,
            map_name: map_name.into(),
            events: Vec::new(),
            final_hash: 0,
        }
    }

    /// Append an event.
    pub fn record(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Store the final session hash.
    pub fn finalize(&mut self, final_hash: u64) {
        self.final_hash = final_hash;
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Encode to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| TacticsError::InvalidState(format!("Failed to serialize recording: {e}")))
    }

    /// Decode from bytes, checking the format version.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are malformed or the version differs.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let recording: Self = bincode::deserialize(bytes).map_err(|e| {
            TacticsError::InvalidState(format!("Failed to deserialize recording: {e}"))
        })?;

        if recording.version != RECORDING_VERSION {
            return Err(TacticsError::RecordingVersion {
                expected: RECORDING_VERSION,
                found: recording.version,
            });
        }

        Ok(recording)
    }

    /// Save the recording to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes).map_err(|e| {
            TacticsError::InvalidState(format!("Failed to write recording file: {e}"))
        })
    }

    /// Load a recording from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or decoding fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| {
            TacticsError::InvalidState(format!("Failed to read recording file: {e}"))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Apply every event to `session` and compare the resulting hash.
    ///
    /// Returns the hash reached by playback.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::InvalidState`] if no map is loaded, and
    /// [`TacticsError::PlaybackDiverged`] if the hashes differ.
    pub fn play(&self, session: &mut MapSession) -> Result<u64> {
        if !session.is_loaded() {
            return Err(TacticsError::InvalidState(
                "No map loaded for playback".to_string(),
            ));
        }
        for &event in &self.events {
            session.handle(event)?;
        }
        let replayed = session.state_hash().unwrap_or_default();
        if replayed != self.final_hash {
            return Err(TacticsError::PlaybackDiverged {
                recorded: self.final_hash,
                replayed,
            });
        }
        tracing::info!(
            map = %self.map_name,
            events = self.events.len(),
            hash = replayed,
            "Playback verified"
        );
        Ok(replayed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_mismatch_rejected() {
        let mut recording = InputRecording::new("test");
        recording.version = RECORDING_VERSION + 1;
        let bytes = bincode::serialize(&recording).unwrap();

        let err = InputRecording::from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            TacticsError::RecordingVersion { found, .. } if found == RECORDING_VERSION + 1
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let mut recording = InputRecording::new("Prologue");
        recording.record(InputEvent::Select);
        recording.record(InputEvent::MoveCursor { dx: 1, dy: 0 });
        recording.record(InputEvent::NavigateMenu(-1));
        recording.finalize(42);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.rec");
        recording.save(&path).unwrap();

        assert_eq!(InputRecording::load(&path).unwrap(), recording);
    }

    #[test]
    fn test_play_requires_map() {
        let recording = InputRecording::new("none");
        assert!(matches!(
            recording.play(&mut MapSession::new()),
            Err(TacticsError::InvalidState(_))
        ));
    }
}
