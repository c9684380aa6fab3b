// Transcript-backed sessions
//
// Replays captured command output from a JSON file, one transcript per
// device address. This is the factory the CLI ships with: capture the
// relevant show commands from your gear, then trace offline as often as
// you like. Unknown commands answer with the vendor rejection marker so
// dialect-retry behaves exactly as it would against the real device.

use super::{Credentials, DeviceSession, DeviceType, SessionFactory};
use crate::error::{TraceError, TraceResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// What a device answers when it does not know a command
const REJECTION_REPLY: &str = "% Invalid input detected at '^' marker.";

#[derive(Debug, Deserialize)]
struct TranscriptFile {
    devices: HashMap<String, HashMap<String, String>>,
}

/// A set of per-device command transcripts acting as a session factory
#[derive(Debug, Clone)]
pub struct ReplayBook {
    devices: HashMap<String, HashMap<String, String>>,
}

impl ReplayBook {
    pub fn from_path(path: &Path) -> TraceResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> TraceResult<Self> {
        let file: TranscriptFile = serde_json::from_str(raw)
            .map_err(|e| TraceError::Config(format!("bad transcript file: {}", e)))?;
        Ok(ReplayBook {
            devices: file.devices,
        })
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

impl SessionFactory for ReplayBook {
    type Session = ReplaySession;

    async fn open(
        &self,
        device: &str,
        _credentials: &Credentials,
        device_type: DeviceType,
    ) -> TraceResult<ReplaySession> {
        let commands = self
            .devices
            .get(device)
            .cloned()
            .ok_or_else(|| TraceError::Transport(format!("no transcript for device {}", device)))?;

        tracing::info!(device, device_type = device_type.label(), "session opened from transcript");
        Ok(ReplaySession {
            device: device.to_string(),
            commands,
            closed: false,
        })
    }
}

/// One replayed session; answers from the captured transcript
#[derive(Debug)]
pub struct ReplaySession {
    device: String,
    commands: HashMap<String, String>,
    closed: bool,
}

impl DeviceSession for ReplaySession {
    async fn send(&mut self, command: &str) -> TraceResult<String> {
        if self.closed {
            return Err(TraceError::Transport(format!(
                "session to {} already closed",
                self.device
            )));
        }
        match self.commands.get(command) {
            Some(output) => {
                tracing::debug!(device = %self.device, command, "replayed command");
                Ok(output.clone())
            }
            None => {
                tracing::debug!(device = %self.device, command, "command not in transcript");
                Ok(REJECTION_REPLY.to_string())
            }
        }
    }

    async fn close(&mut self) {
        if !self.closed {
            tracing::debug!(device = %self.device, "session closed");
            self.closed = true;
        }
    }
}
