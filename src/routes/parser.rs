// Vendor CLI routing-table text parser
//
// Converts raw `show ip route` output into a normalized RouteTable. The
// parser is pure and never fails: lines it cannot make sense of are skipped,
// which is the only sane stance toward heterogeneous vendor CLI output.

use super::{RouteTable, RoutingProtocol};
use ipnet::Ipv4Net;

/// Mask/protocol context carried across lines.
///
/// Vendor tables omit the mask when subnets share one ("is subnetted"
/// headers) and omit the whole network on equal-cost continuation lines
/// ("via" lines). Both inherit from the most recent line that spelled
/// them out.
#[derive(Debug, Clone, Copy, Default)]
struct Continuation {
    implied_mask: Option<u8>,
    implied_network: Option<Ipv4Net>,
    implied_protocol: Option<RoutingProtocol>,
}

/// Parse raw routing-table text into structured route entries.
pub fn parse_route_table(raw: &str) -> RouteTable {
    let mut table = RouteTable::default();
    let mut cont = Continuation::default();

    for line in raw.lines() {
        parse_line(line, &mut cont, &mut table);
    }

    table
}

fn parse_line(line: &str, cont: &mut Continuation, table: &mut RouteTable) {
    let lowered = line.to_lowercase();

    // "Gateway of last resort ..." is a summary, not a route, and must not
    // feed the mask-continuation context.
    if lowered.contains("gateway") {
        return;
    }

    let is_subnetted_header = lowered.contains("is subnetted");
    let is_via_line = lowered.contains("via");

    let mut protocol: Option<RoutingProtocol> = None;
    let mut network: Option<Ipv4Net> = None;
    let mut next_hop: Option<String> = None;

    for token in line.split_whitespace() {
        let token = token.trim_matches(',');

        if let Some(p) = RoutingProtocol::from_code(token) {
            protocol = Some(p);
        }

        // Continuation line for a multi-path route: no network of its own,
        // reuse the one from the line that introduced the route.
        // ex: O 10.2.0.1/32 [110/2] via 172.31.6.2, 04:44:06, Vlan6
        //                   [110/2] via 172.31.3.2, 04:44:06, Vlan3
        if token.eq_ignore_ascii_case("via") && network.is_none() {
            network = cont.implied_network;
            if protocol.is_none() {
                protocol = cont.implied_protocol;
            }
        }

        if looks_like_ipv4(token) && network.is_none() {
            if token.contains('/') {
                if let Ok(net) = token.parse::<Ipv4Net>() {
                    let net = net.trunc();
                    network = Some(net);

                    // Remember mask, network and protocol for the lines
                    // underneath that omit them.
                    if is_subnetted_header || is_via_line {
                        cont.implied_mask = Some(net.prefix_len());
                        cont.implied_network = Some(net);
                        cont.implied_protocol = protocol;
                    }
                }
            } else if let Some(mask) = cont.implied_mask {
                // Mask omitted because subnets share it with the header
                // ex: 172.31.0.0/24 is subnetted, 4 subnets
                //       C  172.31.3.0 is directly connected, Vlan3
                if let Ok(addr) = token.parse() {
                    network = Ipv4Net::new(addr, mask).ok().map(|n| n.trunc());
                }
            }
        } else if looks_like_ipv4(token) && network.is_some() && next_hop.is_none() {
            // Second address on the line is the next-hop gateway
            next_hop = Some(token.to_string());
        }

        if next_hop.is_none() && is_interface_token(token) {
            next_hop = Some(token.to_string());
        }
    }

    if let (Some(network), Some(next_hop)) = (network, next_hop) {
        let Some(protocol) = protocol.or(cont.implied_protocol) else {
            return;
        };
        table.add_hop(network, protocol, next_hop);
    }
}

/// Dotted-quad shape: exactly three embedded dots (with or without /mask)
fn looks_like_ipv4(token: &str) -> bool {
    token.matches('.').count() == 3
}

/// Interface names carry a slash (FastEthernet1/0) or a vlan/loopback
/// prefix. Cost/AD tokens like [110/2] also carry a slash but never a
/// letter, which is what tells them apart.
fn is_interface_token(token: &str) -> bool {
    let lowered = token.to_lowercase();
    let shaped = token.contains('/') || lowered.contains("vlan") || lowered.contains("loopback");
    shaped && token.chars().any(|c| c.is_ascii_alphabetic()) && !looks_like_ipv4(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RouteEntry;

    const SAMPLE_TABLE: &str = r#"Codes: C - connected, S - static, R - RIP, M - mobile, B - BGP
       D - EIGRP, EX - EIGRP external, O - OSPF, IA - OSPF inter area
       N1 - OSPF NSSA external type 1, N2 - OSPF NSSA external type 2
       E1 - OSPF external type 1, E2 - OSPF external type 2
       i - IS-IS, su - IS-IS summary, L1 - IS-IS level-1, L2 - IS-IS level-2

Gateway of last resort is not set

     172.31.0.0/24 is subnetted, 4 subnets
C       172.31.3.0 is directly connected, Vlan3
C       172.31.2.0 is directly connected, Vlan2
C       172.31.6.0 is directly connected, Vlan6
O       172.31.5.0 [110/2] via 172.31.6.2, 04:44:06, Vlan6
     10.2.0.0/32 is subnetted, 1 subnets
O       10.2.0.1 [110/2] via 172.31.6.2, 04:44:06, Vlan6
D    192.168.10.0/24 [90/284160] via 172.31.6.1, 03:53:03, Vlan6
"#;

    fn entry<'a>(table: &'a RouteTable, net: &str) -> &'a RouteEntry {
        let net: Ipv4Net = net.parse().unwrap();
        table.entry(net).unwrap_or_else(|| panic!("no entry for {}", net))
    }

    #[test]
    fn test_connected_routes_inherit_header_mask() {
        let table = parse_route_table(SAMPLE_TABLE);

        let vlan3 = entry(&table, "172.31.3.0/24");
        assert_eq!(vlan3.protocol, RoutingProtocol::Connected);
        assert_eq!(vlan3.next_hops, vec!["Vlan3".to_string()]);

        let vlan2 = entry(&table, "172.31.2.0/24");
        assert_eq!(vlan2.next_hops, vec!["Vlan2".to_string()]);
    }

    #[test]
    fn test_host_route_inherits_header_mask() {
        let table = parse_route_table(SAMPLE_TABLE);

        let host = entry(&table, "10.2.0.1/32");
        assert_eq!(host.protocol, RoutingProtocol::Ospf);
        assert_eq!(host.next_hops, vec!["172.31.6.2".to_string()]);
    }

    #[test]
    fn test_next_hop_ip_wins_over_trailing_interface() {
        let table = parse_route_table(SAMPLE_TABLE);

        // the via address, not Vlan6, is the next hop for a learned route
        let learned = entry(&table, "192.168.10.0/24");
        assert_eq!(learned.protocol, RoutingProtocol::Eigrp);
        assert_eq!(learned.next_hops, vec!["172.31.6.1".to_string()]);
    }

    #[test]
    fn test_equal_cost_continuation_lines() {
        let raw = "\
O    10.2.0.1/32 [110/2] via 172.31.6.2, 04:44:06, Vlan6
                 [110/2] via 172.31.3.2, 04:44:06, Vlan3
";
        let table = parse_route_table(raw);

        assert_eq!(table.len(), 1);
        let multi = entry(&table, "10.2.0.1/32");
        assert_eq!(
            multi.next_hops,
            vec!["172.31.6.2".to_string(), "172.31.3.2".to_string()]
        );
    }

    #[test]
    fn test_cost_token_is_not_an_interface() {
        let raw = "O    10.5.0.0/24 [110/2] via 172.31.6.2, 04:44:06, Vlan6\n";
        let table = parse_route_table(raw);

        let e = entry(&table, "10.5.0.0/24");
        assert_eq!(e.next_hops, vec!["172.31.6.2".to_string()]);
    }

    #[test]
    fn test_physical_interface_next_hop() {
        let raw = "C    192.168.160.0/24 is directly connected, FastEthernet1/0\n";
        let table = parse_route_table(raw);

        let e = entry(&table, "192.168.160.0/24");
        assert_eq!(e.next_hops, vec!["FastEthernet1/0".to_string()]);
    }

    #[test]
    fn test_gateway_summary_and_legend_lines_dropped() {
        let table = parse_route_table(SAMPLE_TABLE);

        // legend and gateway lines produce no entries: 4 subnetted + host + EIGRP
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn test_garbage_is_skipped_not_fatal() {
        let table = parse_route_table("%& not a route\n\n   \nC totally connected\n");
        assert!(table.is_empty());
    }

    #[test]
    fn test_reparse_of_serialized_table_is_equal() {
        let table = parse_route_table(SAMPLE_TABLE);

        let mut rendered = String::new();
        for e in &table.entries {
            for hop in &e.next_hops {
                rendered.push_str(&format!("{}    {} via {}\n", e.protocol.code(), e.network, hop));
            }
        }

        assert_eq!(parse_route_table(&rendered), table);
    }
}
