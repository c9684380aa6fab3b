// Discovery module - finding the next device behind a resolved interface
//
// Two sources of adjacency: the neighbor-protocol detail query (point to
// point links) and ARP/MAC table correlation (shared segments, where the
// next hop is an address on a VLAN rather than a cabled neighbor).

pub mod neighbor;
pub mod tables;

use crate::session::DeviceType;
use serde::{Deserialize, Serialize};

/// Identity of the device on the far side of an interface. Built up from
/// ARP/MAC correlation and the neighbor detail query, consumed by the
/// orchestrator within the same hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborRecord {
    /// MAC of the next-hop host, when correlation ran
    pub mac_address: Option<String>,
    /// Address the correlation chased on the shared segment
    pub ip_address: Option<String>,
    /// Egress interface the neighbor was found behind
    pub interface: String,
    /// Management address to open the next session against
    pub remote_device_address: Option<String>,
    /// Family parsed from the platform marker, if recognized
    pub remote_device_type: Option<DeviceType>,
}

/// A VLAN or loopback next hop sits on a shared segment, so the neighbor
/// has to be chased through the ARP and MAC tables first.
pub fn is_shared_segment(interface: &str) -> bool {
    let lowered = interface.to_lowercase();
    lowered.contains("vlan") || lowered.contains("loopback")
}
