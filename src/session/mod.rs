// Session module - the command transport seam
//
// The tracer never talks to devices itself. It consumes a DeviceSession
// opened by a SessionFactory, sends vendor CLI commands over it, and closes
// it when the hop is done. Anything that can authenticate, run a command
// and hand back raw text can drive a trace.

pub mod replay;

use crate::error::TraceResult;
use serde::{Deserialize, Serialize};

/// Device OS family. Decides which command dialects to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Ios,
    IosXe,
    Nxos,
}

impl DeviceType {
    /// Assumed family when a neighbor's platform marker is unrecognized
    pub const DEFAULT: DeviceType = DeviceType::Ios;

    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "cisco_ios" | "ios" => Some(DeviceType::Ios),
            "cisco_xe" | "ios_xe" | "ios-xe" => Some(DeviceType::IosXe),
            "cisco_nxos" | "nxos" | "nx-os" => Some(DeviceType::Nxos),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeviceType::Ios => "cisco_ios",
            DeviceType::IosXe => "cisco_xe",
            DeviceType::Nxos => "cisco_nxos",
        }
    }
}

/// Login material handed to the factory for every hop
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Enable secret; assumed equal to the password when absent
    pub secret: Option<String>,
}

impl Credentials {
    pub fn secret(&self) -> &str {
        self.secret.as_deref().unwrap_or(&self.password)
    }
}

/// Devices signal a bad command with this marker instead of an error code
pub fn command_rejected(output: &str) -> bool {
    output.to_lowercase().contains("invalid input")
}

/// One open CLI session against a device
pub trait DeviceSession: Send {
    /// Send a command and return its raw text output
    fn send(
        &mut self,
        command: &str,
    ) -> impl std::future::Future<Output = TraceResult<String>> + Send;

    /// Close the session. Idempotent and safe to call after a failure.
    fn close(&mut self) -> impl std::future::Future<Output = ()> + Send;
}

/// Opens sessions to devices by address
pub trait SessionFactory: Send + Sync {
    type Session: DeviceSession;

    fn open(
        &self,
        device: &str,
        credentials: &Credentials,
        device_type: DeviceType,
    ) -> impl std::future::Future<Output = TraceResult<Self::Session>> + Send;
}
