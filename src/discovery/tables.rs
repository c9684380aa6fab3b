// ARP and MAC table parsing and host correlation
//
// Token shapes do all the work here: a dotted-triple (aabb.ccdd.eeff) is a
// MAC, a dotted-quad is an IP, and anything with a slash or a vlan prefix
// is an interface. Columns move around between platforms; shapes don't.

use std::collections::HashMap;

/// Where a host was found: its MAC and the interface it appears behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLocation {
    pub mac_address: String,
    pub interface: String,
}

/// Parse `show ip arp` output into an IP -> MAC map
pub fn parse_arp_table(raw: &str) -> HashMap<String, String> {
    let mut arp = HashMap::new();

    for line in raw.lines() {
        let mut ip = None;
        let mut mac = None;

        for token in line.split_whitespace() {
            if looks_like_mac(token) {
                mac = Some(token.to_string());
            } else if looks_like_ipv4(token) {
                ip = Some(token.to_string());
            }
        }

        if let (Some(ip), Some(mac)) = (ip, mac) {
            arp.insert(ip, mac);
        }
    }

    arp
}

/// Parse `show mac address-table` output into a MAC -> interface map
pub fn parse_mac_table(raw: &str) -> HashMap<String, String> {
    let mut table = HashMap::new();

    for line in raw.lines() {
        let mut mac = None;
        let mut interface = None;

        for token in line.split_whitespace() {
            if looks_like_mac(token) {
                mac = Some(token.to_string());
            } else if is_interface_token(token) {
                interface = Some(token.to_string());
            }
        }

        if let (Some(mac), Some(interface)) = (mac, interface) {
            table.insert(mac, interface);
        }
    }

    table
}

/// Locate `host` by cross-referencing the ARP and MAC tables. The host may
/// be given as an IP (looked up in ARP first) or directly as a MAC.
pub fn locate_host(host: &str, raw_mac_table: &str, raw_arp_table: &str) -> Option<HostLocation> {
    let mac_table = parse_mac_table(raw_mac_table);

    if looks_like_mac(host) {
        return mac_table.get(host).map(|interface| HostLocation {
            mac_address: host.to_string(),
            interface: interface.clone(),
        });
    }

    if looks_like_ipv4(host) {
        let arp = parse_arp_table(raw_arp_table);
        let mac = arp.get(host)?;
        return mac_table.get(mac).map(|interface| HostLocation {
            mac_address: mac.clone(),
            interface: interface.clone(),
        });
    }

    None
}

/// Dotted-triple MAC shape, e.g. 0050.7966.6800
fn looks_like_mac(token: &str) -> bool {
    token.matches('.').count() == 2
}

fn looks_like_ipv4(token: &str) -> bool {
    token.matches('.').count() == 3
}

fn is_interface_token(token: &str) -> bool {
    let lowered = token.to_lowercase();
    (token.contains('/') || lowered.contains("vlan"))
        && token.chars().any(|c| c.is_ascii_alphabetic())
}
