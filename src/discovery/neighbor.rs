// Neighbor-protocol adjacency discovery
//
// Asks the current device who sits behind an interface. Point-to-point
// links answer the detail query directly; shared segments (VLAN, loopback
// next hops) need the target chased through ARP and MAC tables first to
// find the real egress port. Command syntax differs between OS families,
// so every query retries once with the alternate dialect when the device
// rejects the first.

use super::{is_shared_segment, tables, NeighborRecord};
use crate::error::{TraceError, TraceResult};
use crate::session::{command_rejected, DeviceSession, DeviceType};
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

const ARP_TABLE_COMMAND: &str = "show ip arp";
const MAC_TABLE_COMMANDS: [&str; 2] = ["show mac-address-table", "show mac address-table"];

/// Work out the management address and family of the device behind
/// `interface`, for a trace currently targeting `target`.
pub async fn discover_next_device<S: DeviceSession>(
    session: &mut S,
    device: &str,
    interface: &str,
    target: Ipv4Net,
) -> TraceResult<NeighborRecord> {
    let mut egress = interface.to_string();
    let mut mac_address = None;
    let mut chased_ip = None;

    if is_shared_segment(interface) {
        let host = first_usable_host(target).to_string();
        tracing::info!(%host, interface, "checking MAC and ARP tables for next hop");

        let raw_arp = session.send(ARP_TABLE_COMMAND).await?;
        let raw_mac = fetch_mac_table(session).await?;

        let location = tables::locate_host(&host, &raw_mac, &raw_arp)
            .ok_or_else(|| TraceError::HostNotFound(host.clone()))?;

        tracing::info!(
            mac = %location.mac_address,
            interface = %location.interface,
            "host located on shared segment"
        );
        mac_address = Some(location.mac_address);
        chased_ip = Some(host);
        egress = location.interface;
    }

    tracing::info!(interface = %egress, "checking if interface is in the neighbor table");
    let output = neighbor_detail(session, &egress).await?;
    if output.trim().is_empty() {
        return Err(TraceError::NeighborNotFound {
            device: device.to_string(),
            interface: egress,
        });
    }

    let (address, device_type) = parse_neighbor_detail(&output);
    let Some(address) = address else {
        return Err(TraceError::NeighborNotFound {
            device: device.to_string(),
            interface: egress,
        });
    };

    Ok(NeighborRecord {
        mac_address,
        ip_address: chased_ip,
        interface: egress,
        remote_device_address: Some(address),
        remote_device_type: device_type,
    })
}

/// Fetch the MAC table, retrying with the alternate command dialect when
/// the device rejects the first
async fn fetch_mac_table<S: DeviceSession>(session: &mut S) -> TraceResult<String> {
    let output = session.send(MAC_TABLE_COMMANDS[0]).await?;
    if !command_rejected(&output) {
        return Ok(output);
    }

    tracing::warn!(
        command = MAC_TABLE_COMMANDS[0],
        "command rejected, retrying alternate syntax"
    );
    let output = session.send(MAC_TABLE_COMMANDS[1]).await?;
    if command_rejected(&output) {
        return Err(TraceError::CommandRejected(MAC_TABLE_COMMANDS[1].to_string()));
    }
    Ok(output)
}

/// Issue the neighbor detail query for an interface, trying both known
/// dialects
async fn neighbor_detail<S: DeviceSession>(session: &mut S, interface: &str) -> TraceResult<String> {
    let command = format!("show cdp neighbors {} detail", interface);
    let output = session.send(&command).await?;
    if !command_rejected(&output) {
        return Ok(output);
    }

    tracing::warn!(%command, "command rejected, retrying alternate syntax");
    let command = format!("show cdp neighbors interface {} detail", interface);
    let output = session.send(&command).await?;
    if command_rejected(&output) {
        return Err(TraceError::CommandRejected(command));
    }
    Ok(output)
}

/// Pull the neighbor's management address and platform family out of the
/// detail output. The last address wins: entry addresses come first,
/// management addresses last, and the management address is the one to
/// log into.
fn parse_neighbor_detail(output: &str) -> (Option<String>, Option<DeviceType>) {
    let mut address = None;
    let mut device_type = None;

    for token in output.split_whitespace() {
        let token = token.trim_matches(',');

        if token.parse::<Ipv4Addr>().is_ok() {
            address = Some(token.to_string());
        }

        if token.contains("NX-OS") {
            device_type = Some(DeviceType::Nxos);
        } else if token.contains("IOS-XE") {
            device_type = Some(DeviceType::IosXe);
        } else if token.contains("IOS") {
            device_type = Some(DeviceType::Ios);
        }
    }

    (address, device_type)
}

/// First usable host address of a network; this is the address to chase
/// in the ARP table (a /32 is its own host)
fn first_usable_host(network: Ipv4Net) -> Ipv4Addr {
    network.hosts().next().unwrap_or_else(|| network.addr())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDP_DETAIL_IOS: &str = "\
-------------------------
Device ID: distswitch2.lab
Entry address(es):
  IP address: 172.31.6.2
Platform: cisco WS-C3750G-24TS,  Capabilities: Switch IGMP
Interface: Vlan6,  Port ID (outgoing port): GigabitEthernet1/0/1
Holdtime : 155 sec

Version :
Cisco IOS Software, C3750 Software (C3750-IPSERVICESK9-M), Version 12.2(55)SE
";

    const CDP_DETAIL_NXOS: &str = "\
Device ID: corenexus.lab
Entry address(es):
  IP address: 10.0.0.7
Platform: N5K-C5548UP, Capabilities: Switch
Cisco Nexus Operating System (NX-OS) Software, Version 7.3(0)
Management address(es):
  IP address: 10.0.0.8
";

    #[test]
    fn test_parse_detail_extracts_address_and_family() {
        let (address, device_type) = parse_neighbor_detail(CDP_DETAIL_IOS);
        assert_eq!(address, Some("172.31.6.2".to_string()));
        assert_eq!(device_type, Some(DeviceType::Ios));
    }

    #[test]
    fn test_parse_detail_prefers_management_address() {
        let (address, device_type) = parse_neighbor_detail(CDP_DETAIL_NXOS);
        assert_eq!(address, Some("10.0.0.8".to_string()));
        assert_eq!(device_type, Some(DeviceType::Nxos));
    }

    #[test]
    fn test_parse_detail_with_no_marker_leaves_family_unset() {
        let (address, device_type) =
            parse_neighbor_detail("Entry address(es):\n  IP address: 192.0.2.9\n");
        assert_eq!(address, Some("192.0.2.9".to_string()));
        assert_eq!(device_type, None);
    }

    #[test]
    fn test_first_usable_host() {
        let host_route: Ipv4Net = "172.31.6.2/32".parse().unwrap();
        assert_eq!(first_usable_host(host_route).to_string(), "172.31.6.2");

        let subnet: Ipv4Net = "172.31.3.0/24".parse().unwrap();
        assert_eq!(first_usable_host(subnet).to_string(), "172.31.3.1");
    }
}
