// Next-hop resolution with longest prefix matching
//
// Given a parsed routing table and a target network, decide whether the
// target is locally attached, reachable through a neighbor on some
// interface, or not reachable at all. Resolution is iterative: a route may
// point at another routable address (static chains, recursive next hops),
// so one external hop can take several passes over the table.

use super::{RouteEntry, RouteTable};
use ipnet::Ipv4Net;
use serde::Serialize;
use std::net::Ipv4Addr;

/// Outcome of resolving one hop against a single device's table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HopResult {
    /// Target network is directly connected here; the trace is done
    Terminal { interface: String },
    /// Target is reachable through a neighbor on this interface;
    /// `resolved_target` is the address to chase on the shared segment
    NextHop {
        interface: String,
        resolved_target: Ipv4Net,
    },
    /// No route covers the target
    Unreachable { reason: String },
}

/// Resolve the best next hop for `target` in `table`.
pub fn resolve_next_hop(target: Ipv4Net, table: &RouteTable) -> HopResult {
    let mut target = target.trunc();
    // set once the target has been rewritten to a gateway address; from
    // then on a Connected match means the gateway is adjacent, not that
    // the original destination lives here
    let mut indirect = false;
    let mut widened = false;
    let mut seen: Vec<Ipv4Net> = Vec::new();

    loop {
        // static chains can point back at themselves
        if seen.contains(&target) {
            return HopResult::Unreachable {
                reason: format!("resolution loop at network {}", target),
            };
        }
        seen.push(target);

        // exact match first
        if let Some(entry) = table.entry(target) {
            let hop = match first_hop(entry) {
                Some(h) => h,
                None => return continue_unreachable(target),
            };
            if entry.protocol.is_connected() && !indirect {
                return HopResult::Terminal { interface: hop };
            }
            if !entry.protocol.is_connected() {
                if let Some(addr) = as_ip_hop(&hop) {
                    // route points at another routable address
                    target = Ipv4Net::from(addr);
                    indirect = true;
                    continue;
                }
            }
            return HopResult::NextHop {
                interface: hop,
                resolved_target: target,
            };
        }

        // no exact match: every strict supernet is a candidate
        let mut candidates: Vec<&RouteEntry> = table
            .entries
            .iter()
            .filter(|e| {
                e.network.prefix_len() < target.prefix_len() && e.network.contains(&target)
            })
            .collect();

        if candidates.is_empty() {
            // a narrow target may still fall under a classful summary;
            // widen once before giving up
            let classful = classful_boundary(target);
            if !widened && classful.prefix_len() < target.prefix_len() {
                widened = true;
                target = classful;
                continue;
            }
            return HopResult::Unreachable {
                reason: format!("no supernet found for network {}", target),
            };
        }

        // longest prefix wins; equal prefixes tie-break on the smallest
        // network address so selection is deterministic
        candidates.sort_by(|a, b| {
            b.network
                .prefix_len()
                .cmp(&a.network.prefix_len())
                .then(a.network.network().cmp(&b.network.network()))
        });
        let best = candidates[0];
        let hop = match first_hop(best) {
            Some(h) => h,
            None => return continue_unreachable(target),
        };

        if let Some(addr) = as_ip_hop(&hop) {
            // supernet routes through a gateway; resolve the gateway
            target = Ipv4Net::from(addr);
            indirect = true;
            continue;
        }

        if best.protocol.is_connected() && !indirect {
            return HopResult::Terminal { interface: hop };
        }

        return HopResult::NextHop {
            interface: hop,
            resolved_target: target,
        };
    }
}

fn continue_unreachable(target: Ipv4Net) -> HopResult {
    HopResult::Unreachable {
        reason: format!("no usable next hop for network {}", target),
    }
}

/// First next hop in table order. With equal-cost multi-path any peer
/// advertising the network has a path to it, so the first is as good as
/// any other.
fn first_hop(entry: &RouteEntry) -> Option<String> {
    entry.next_hops.first().cloned()
}

/// A next hop that is a plain dotted-quad address rather than an
/// interface name
fn as_ip_hop(hop: &str) -> Option<Ipv4Addr> {
    if hop.contains('/') {
        return None;
    }
    hop.parse().ok()
}

/// Classful containing network for an address: /8, /16 or /24 by the
/// historical class ranges
fn classful_boundary(target: Ipv4Net) -> Ipv4Net {
    let first_octet = target.addr().octets()[0];
    let prefix = match first_octet {
        0..=127 => 8,
        128..=191 => 16,
        _ => 24,
    };
    Ipv4Net::new(target.addr(), prefix)
        .map(|n| n.trunc())
        .unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::parser::parse_route_table;

    fn net(s: &str) -> Ipv4Net {
        s.parse().unwrap()
    }

    const DEVICE_A: &str = "\
     172.31.0.0/24 is subnetted, 4 subnets
C       172.31.3.0 is directly connected, Vlan3
C       172.31.2.0 is directly connected, Vlan2
C       172.31.6.0 is directly connected, Vlan6
O       172.31.5.0 [110/2] via 172.31.6.2, 04:44:06, Vlan6
     10.2.0.0/32 is subnetted, 1 subnets
O       10.2.0.1 [110/2] via 172.31.6.2, 04:44:06, Vlan6
";

    #[test]
    fn test_exact_connected_is_terminal() {
        let table = parse_route_table(DEVICE_A);
        let result = resolve_next_hop(net("172.31.3.0/24"), &table);
        assert_eq!(
            result,
            HopResult::Terminal {
                interface: "Vlan3".to_string()
            }
        );
    }

    #[test]
    fn test_host_in_connected_supernet_is_terminal() {
        let table = parse_route_table(DEVICE_A);
        let result = resolve_next_hop(net("172.31.3.5/32"), &table);
        assert_eq!(
            result,
            HopResult::Terminal {
                interface: "Vlan3".to_string()
            }
        );
    }

    #[test]
    fn test_ospf_host_route_resolves_indirectly_to_vlan() {
        let table = parse_route_table(DEVICE_A);
        // exact OSPF match points at 172.31.6.2, which lives in the
        // connected Vlan6 segment; discovery must run there
        let result = resolve_next_hop(net("10.2.0.1/32"), &table);
        assert_eq!(
            result,
            HopResult::NextHop {
                interface: "Vlan6".to_string(),
                resolved_target: net("172.31.6.2/32"),
            }
        );
    }

    #[test]
    fn test_no_route_is_unreachable() {
        let table = parse_route_table(DEVICE_A);
        let result = resolve_next_hop(net("203.0.113.0/24"), &table);
        match result {
            HopResult::Unreachable { reason } => {
                assert!(reason.contains("no supernet found"), "reason: {}", reason);
            }
            other => panic!("expected Unreachable, got {:?}", other),
        }
    }

    #[test]
    fn test_longest_prefix_wins() {
        let raw = "\
D    10.0.0.0/8 [90/284160] via 172.31.6.1, 03:53:03, Vlan6
O    10.2.0.0/16 [110/2] via 172.31.5.2, 04:44:06, Vlan5
C    10.2.3.0/24 is directly connected, Vlan3
";
        let table = parse_route_table(raw);
        let result = resolve_next_hop(net("10.2.3.77/32"), &table);
        assert_eq!(
            result,
            HopResult::Terminal {
                interface: "Vlan3".to_string()
            }
        );
    }

    #[test]
    fn test_selection_is_independent_of_table_order() {
        let expected = HopResult::NextHop {
            interface: "Vlan5".to_string(),
            resolved_target: net("10.2.3.0/24"),
        };

        for raw in [
            "O    10.2.0.0/16 [110/2] via Vlan5\nD    10.0.0.0/8 [90/284160] via Vlan6\n",
            "D    10.0.0.0/8 [90/284160] via Vlan6\nO    10.2.0.0/16 [110/2] via Vlan5\n",
        ] {
            let table = parse_route_table(raw);
            assert_eq!(resolve_next_hop(net("10.2.3.0/24"), &table), expected);
        }
    }

    #[test]
    fn test_supernet_match_picks_first_of_equal_cost_hops() {
        let raw = "\
O    10.2.0.0/16 [110/2] via Vlan5
                 [110/2] via Vlan6
";
        let table = parse_route_table(raw);
        let result = resolve_next_hop(net("10.2.3.0/24"), &table);
        assert_eq!(
            result,
            HopResult::NextHop {
                interface: "Vlan5".to_string(),
                resolved_target: net("10.2.3.0/24"),
            }
        );
    }

    #[test]
    fn test_static_chain_follows_gateway() {
        let raw = "\
S    192.168.50.0/24 [1/0] via 10.9.9.9
C    10.9.9.0/24 is directly connected, FastEthernet0/1
";
        let table = parse_route_table(raw);
        let result = resolve_next_hop(net("192.168.50.0/24"), &table);
        assert_eq!(
            result,
            HopResult::NextHop {
                interface: "FastEthernet0/1".to_string(),
                resolved_target: net("10.9.9.9/32"),
            }
        );
    }

    #[test]
    fn test_self_referential_static_chain_terminates() {
        let raw = "\
S    192.168.50.0/24 [1/0] via 10.9.9.9
S    10.9.9.9/32 [1/0] via 192.168.50.1
S    192.168.50.1/32 [1/0] via 10.9.9.9
";
        let table = parse_route_table(raw);
        let result = resolve_next_hop(net("192.168.50.0/24"), &table);
        match result {
            HopResult::Unreachable { reason } => {
                assert!(reason.contains("resolution loop"), "reason: {}", reason);
            }
            other => panic!("expected Unreachable, got {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_subnet_reports_widened_network() {
        let table = parse_route_table(DEVICE_A);
        // nothing covers the /28; the classful retry runs and still finds
        // nothing, so the reported network is the widened /16
        let result = resolve_next_hop(net("172.20.44.16/28"), &table);
        assert_eq!(
            result,
            HopResult::Unreachable {
                reason: "no supernet found for network 172.20.0.0/16".to_string()
            }
        );
    }
}
