//! JSON protocol for the headless input runner.
//!
//! The runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from a test driver
//! **Output (stdout):** Responses, one per command
//! **Logs (stderr):** Tracing output
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","map":"Prologue"}
//! -> {"cmd":"input","event":"select"}
//! <- {"type":"feedback","feedback":{"kind":"unit_selected","unit":0}}
//! -> {"cmd":"input","event":{"move_cursor":{"dx":1,"dy":0}}}
//! <- {"type":"feedback","feedback":{"kind":"cursor_moved","to":{"x":3,"y":2}}}
//! -> {"cmd":"hash"}
//! <- {"type":"state_hash","events":2,"hash":1234567890}
//! -> {"cmd":"quit"}
//! <- {"type":"bye"}
//! ```

use serde::{Deserialize, Serialize};

use tactics_core::prelude::*;

/// Protocol version reported in the ready line.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (driver -> runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Apply one input event.
    Input {
        /// The event.
        event: InputEvent,
    },

    /// Query the current frame without changing anything.
    Query,

    /// Report the state hash (for determinism verification).
    Hash,

    /// Render the current frame as plain ASCII.
    Render,

    /// Let every unit of a faction act again.
    ClearMoved {
        /// Faction to refresh.
        faction: Faction,
    },

    /// Stop the runner.
    Quit,
}

// ============================================================================
// Output Responses (runner -> driver)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
        /// Loaded map, if any.
        map: Option<String>,
    },

    /// Outcome of an input event.
    Feedback {
        /// What the event did.
        feedback: Feedback,
    },

    /// Current frame.
    State {
        /// Serialized session view, `null` without a map.
        view: serde_json::Value,
        /// State hash.
        hash: Option<u64>,
    },

    /// State hash for determinism verification.
    StateHash {
        /// Input events applied so far.
        events: usize,
        /// State hash, absent without a map.
        hash: Option<u64>,
    },

    /// ASCII frame.
    Frame {
        /// Rendered text.
        text: String,
    },

    /// Units refreshed by `clear_moved`.
    Cleared {
        /// Number of units that can act again.
        count: usize,
    },

    /// Error processing a command.
    Error {
        /// What went wrong.
        message: String,
        /// Command that failed, if it parsed.
        cmd: Option<String>,
    },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(map: Option<&str>) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            map: map.map(String::from),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for malformed or unknown commands.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Render => "render",
            Self::ClearMoved { .. } => "clear_moved",
            Self::Quit => "quit",
        }
    }
}
