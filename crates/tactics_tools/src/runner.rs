//! Headless input runner.
//!
//! Drives a [`MapSession`] from JSON-lines commands without a renderer, for
//! scripted tests and replay capture. See [`crate::protocol`] for the wire
//! format.

use std::io::{BufRead, Write};

use tactics_core::prelude::*;

use crate::ascii_view::{render_session, AsciiConfig};
use crate::data_loader::{DataLoadError, DataLoadResult};
use crate::protocol::{Command, Response};

/// Configuration for the headless runner.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Capture applied input events into an [`InputRecording`].
    pub record: bool,
}

/// Headless runner state.
#[derive(Debug)]
pub struct HeadlessRunner {
    session: MapSession,
    recording: Option<InputRecording>,
    events: usize,
}

impl HeadlessRunner {
    /// Wrap a session.
    #[must_use]
    pub fn new(session: MapSession, config: &HeadlessConfig) -> Self {
        let recording = config.record.then(|| InputRecording::new(map_name(&session)));
        Self {
            session,
            recording,
            events: 0,
        }
    }

    /// The driven session.
    #[must_use]
    pub fn session(&self) -> &MapSession {
        &self.session
    }

    /// Number of input events applied.
    #[must_use]
    pub fn events(&self) -> usize {
        self.events
    }

    /// Execute one command.
    pub fn execute(&mut self, command: &Command) -> Response {
        match command {
            Command::Input { event } => match self.session.handle(*event) {
                Ok(feedback) => {
                    self.events += 1;
                    if let Some(recording) = &mut self.recording {
                        recording.record(*event);
                    }
                    Response::Feedback { feedback }
                }
                Err(e) => {
                    tracing::error!("Input {event:?} failed: {e}");
                    Response::error(e.to_string(), Some(command.name()))
                }
            },
            Command::Query => {
                let view = match self.session.view().map(|view| serde_json::to_value(&view)) {
                    Some(Ok(value)) => value,
                    Some(Err(e)) => return Response::error(e.to_string(), Some(command.name())),
                    None => serde_json::Value::Null,
                };
                Response::State {
                    view,
                    hash: self.session.state_hash(),
                }
            }
            Command::Hash => Response::StateHash {
                events: self.events,
                hash: self.session.state_hash(),
            },
            Command::Render => {
                let config = AsciiConfig {
                    show_legend: true,
                    use_color: false,
                };
                match render_session(&self.session, &config) {
                    Some(text) => Response::Frame { text },
                    None => Response::error("No map loaded", Some(command.name())),
                }
            }
            Command::ClearMoved { faction } => {
                // Recordings hold input events only, so a refresh would not replay.
                if self.recording.is_some() {
                    return Response::error(
                        "clear_moved is unavailable while recording",
                        Some(command.name()),
                    );
                }
                Response::Cleared {
                    count: self.session.clear_moved(*faction),
                }
            }
            Command::Quit => Response::Bye,
        }
    }

    /// Read commands from `input` until `quit` or end of input, writing one
    /// response line per command to `output`.
    ///
    /// Malformed lines get an error response and are otherwise skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> DataLoadResult<()> {
        let ready = Response::ready(self.session.battlefield().map(|f| f.grid().name()));
        send(&mut output, &ready)?;

        for line in input.lines() {
            let line = line.map_err(|e| DataLoadError::IoError {
                path: "<input>".to_string(),
                source: e,
            })?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match Command::from_json(line) {
                Ok(command) => {
                    let response = self.execute(&command);
                    send(&mut output, &response)?;
                    if command == Command::Quit {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Rejected command line: {e}");
                    send(&mut output, &Response::error(format!("Invalid command: {e}"), None))?;
                }
            }
        }

        tracing::info!("Runner finished after {} input events", self.events);
        Ok(())
    }

    /// Finish the run, returning the finalized recording if one was kept.
    #[must_use]
    pub fn finish(self) -> Option<InputRecording> {
        let hash = self.session.state_hash().unwrap_or_default();
        self.recording.map(|mut recording| {
            recording.finalize(hash);
            recording
        })
    }
}

fn send<W: Write>(output: &mut W, response: &Response) -> DataLoadResult<()> {
    output
        .write_all(response.to_json_line().as_bytes())
        .and_then(|()| output.flush())
        .map_err(|e| DataLoadError::IoError {
            path: "<output>".to_string(),
            source: e,
        })
}

fn map_name(session: &MapSession) -> String {
    session
        .battlefield()
        .map(|field| field.grid().name().to_string())
        .unwrap_or_default()
}

/// Play a recording against `session` and return the verified final hash.
///
/// # Errors
///
/// Returns the core error if playback fails or the hash diverges.
pub fn replay(recording: &InputRecording, session: &mut MapSession) -> DataLoadResult<u64> {
    let loaded = map_name(session);
    if recording.map_name != loaded {
        tracing::warn!(
            "Recording was made on '{}' but '{loaded}' is loaded",
            recording.map_name
        );
    }
    let hash = recording.play(session)?;
    tracing::info!(
        "Replayed {} events on '{loaded}', final hash {hash:#018x}",
        recording.len()
    );
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_test_utils::fixtures::lone_seth;

    #[test]
    fn test_no_map_is_harmless() {
        let mut runner = HeadlessRunner::new(MapSession::new(), &HeadlessConfig::default());
        let response = runner.execute(&Command::Input {
            event: InputEvent::Select,
        });
        assert_eq!(
            response,
            Response::Feedback {
                feedback: Feedback::Ignored
            }
        );
        assert!(matches!(runner.execute(&Command::Render), Response::Error { .. }));
        assert_eq!(
            runner.execute(&Command::Hash),
            Response::StateHash { events: 1, hash: None }
        );
    }

    #[test]
    fn test_clear_moved_refused_while_recording() {
        let session = lone_seth().session(Rules::default());
        let mut runner = HeadlessRunner::new(session, &HeadlessConfig { record: true });
        let response = runner.execute(&Command::ClearMoved {
            faction: Faction::Player,
        });
        assert!(matches!(response, Response::Error { .. }));
    }

    #[test]
    fn test_recording_captures_events() {
        let session = lone_seth().session(Rules::default());
        let mut runner = HeadlessRunner::new(session, &HeadlessConfig { record: true });
        runner.execute(&Command::Input {
            event: InputEvent::Select,
        });
        runner.execute(&Command::Query);
        runner.execute(&Command::Input {
            event: InputEvent::RIGHT,
        });
        let hash = runner.session().state_hash();

        let recording = runner.finish().unwrap();
        assert_eq!(recording.events, vec![InputEvent::Select, InputEvent::RIGHT]);
        assert_eq!(recording.map_name, "Fixture");
        assert_eq!(Some(recording.final_hash), hash);
    }
}
