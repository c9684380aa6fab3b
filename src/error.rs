// Error types for the network path tracer

use thiserror::Error;

/// Main error type for a trace run
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Authentication failed on device {0}")]
    Authentication(String),

    #[error("Unsupported device type: {0}")]
    UnsupportedDeviceType(String),

    #[error("Command rejected by device: {0}")]
    CommandRejected(String),

    #[error("No route: {0}")]
    NoRouteFound(String),

    #[error("Host {0} not found in ARP or MAC table")]
    HostNotFound(String),

    #[error("No neighbor discovered on interface {interface} of device {device}")]
    NeighborNotFound { device: String, interface: String },

    #[error("Cycle detected: device {0} already visited")]
    CycleDetected(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using TraceError
pub type TraceResult<T> = Result<T, TraceError>;

impl TraceError {
    /// Convert error to user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            TraceError::Authentication(device) => {
                format!("Authentication failure on {}. Exiting trace route.", device)
            }
            TraceError::UnsupportedDeviceType(dt) => {
                format!("Device type {} does not exist. Exiting trace route.", dt)
            }
            TraceError::CommandRejected(cmd) => {
                format!("The device rejected every known syntax for '{}'.", cmd)
            }
            TraceError::NoRouteFound(reason) => {
                format!("{}. The network cannot be traced.", reason)
            }
            TraceError::HostNotFound(host) => {
                format!("Host {} not found in ARP or MAC table. Please double check the host.", host)
            }
            TraceError::NeighborNotFound { device, interface } => {
                format!(
                    "Network couldn't be traced past interface {} on router {}.",
                    interface, device
                )
            }
            TraceError::CycleDetected(device) => {
                format!("Device {} was already visited. The routing tables form a loop.", device)
            }
            TraceError::Transport(_) => {
                "Session transport error. Check connectivity to the device.".to_string()
            }
            TraceError::Io(_) => "File system error. Check permissions and paths.".to_string(),
            TraceError::Config(_) => {
                "Configuration error. Check your config file or command-line arguments.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_names_device() {
        let err = TraceError::NeighborNotFound {
            device: "172.31.6.1".to_string(),
            interface: "Vlan6".to_string(),
        };
        let msg = err.user_message();
        assert!(msg.contains("Vlan6"));
        assert!(msg.contains("172.31.6.1"));
    }
}
