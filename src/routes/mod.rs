// Routes module - routing-table data model, parsing and next-hop resolution

pub mod lookup;
pub mod parser;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Routing protocol that installed a route, from the vendor code column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingProtocol {
    Connected,
    Static,
    Rip,
    Mobile,
    Bgp,
    Eigrp,
    Ospf,
    OspfInterArea,
    OspfNssaExternal1,
    OspfNssaExternal2,
    OspfExternal1,
    OspfExternal2,
    IsIs,
    IsIsSummary,
    IsIsLevel1,
    IsIsLevel2,
    IsIsInterArea,
}

impl RoutingProtocol {
    /// Map a route-table code token (e.g. "C", "O", "IA") to a protocol.
    /// Codes are case-sensitive: "ia" and "IA" are different protocols.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "C" => Some(RoutingProtocol::Connected),
            "S" => Some(RoutingProtocol::Static),
            "R" => Some(RoutingProtocol::Rip),
            "M" => Some(RoutingProtocol::Mobile),
            "B" => Some(RoutingProtocol::Bgp),
            "D" => Some(RoutingProtocol::Eigrp),
            "O" => Some(RoutingProtocol::Ospf),
            "IA" => Some(RoutingProtocol::OspfInterArea),
            "N1" => Some(RoutingProtocol::OspfNssaExternal1),
            "N2" => Some(RoutingProtocol::OspfNssaExternal2),
            "E1" => Some(RoutingProtocol::OspfExternal1),
            "E2" => Some(RoutingProtocol::OspfExternal2),
            "i" => Some(RoutingProtocol::IsIs),
            "su" => Some(RoutingProtocol::IsIsSummary),
            "L1" => Some(RoutingProtocol::IsIsLevel1),
            "L2" => Some(RoutingProtocol::IsIsLevel2),
            "ia" => Some(RoutingProtocol::IsIsInterArea),
            _ => None,
        }
    }

    /// The vendor code column token for this protocol
    pub fn code(&self) -> &'static str {
        match self {
            RoutingProtocol::Connected => "C",
            RoutingProtocol::Static => "S",
            RoutingProtocol::Rip => "R",
            RoutingProtocol::Mobile => "M",
            RoutingProtocol::Bgp => "B",
            RoutingProtocol::Eigrp => "D",
            RoutingProtocol::Ospf => "O",
            RoutingProtocol::OspfInterArea => "IA",
            RoutingProtocol::OspfNssaExternal1 => "N1",
            RoutingProtocol::OspfNssaExternal2 => "N2",
            RoutingProtocol::OspfExternal1 => "E1",
            RoutingProtocol::OspfExternal2 => "E2",
            RoutingProtocol::IsIs => "i",
            RoutingProtocol::IsIsSummary => "su",
            RoutingProtocol::IsIsLevel1 => "L1",
            RoutingProtocol::IsIsLevel2 => "L2",
            RoutingProtocol::IsIsInterArea => "ia",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, RoutingProtocol::Connected)
    }
}

impl fmt::Display for RoutingProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RoutingProtocol::Connected => "Connected",
            RoutingProtocol::Static => "Static",
            RoutingProtocol::Rip => "RIP",
            RoutingProtocol::Mobile => "Mobile",
            RoutingProtocol::Bgp => "BGP",
            RoutingProtocol::Eigrp => "EIGRP",
            RoutingProtocol::Ospf => "OSPF",
            RoutingProtocol::OspfInterArea => "OSPF inter area",
            RoutingProtocol::OspfNssaExternal1 => "OSPF NSSA external type 1",
            RoutingProtocol::OspfNssaExternal2 => "OSPF NSSA external type 2",
            RoutingProtocol::OspfExternal1 => "OSPF external type 1",
            RoutingProtocol::OspfExternal2 => "OSPF external type 2",
            RoutingProtocol::IsIs => "IS-IS",
            RoutingProtocol::IsIsSummary => "IS-IS summary",
            RoutingProtocol::IsIsLevel1 => "IS-IS level-1",
            RoutingProtocol::IsIsLevel2 => "IS-IS level-2",
            RoutingProtocol::IsIsInterArea => "IS-IS inter area",
        };
        f.write_str(label)
    }
}

/// One normalized route: a network, its protocol, and every next hop seen
/// for it in table order. Multiple hops mean equal-cost multi-path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub network: Ipv4Net,
    pub protocol: RoutingProtocol,
    /// Interface names or next-hop IP addresses, in table order
    pub next_hops: Vec<String>,
}

/// Parsed routing table, entries in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn entry(&self, network: Ipv4Net) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.network == network)
    }

    /// Append a next hop to the entry for `network`, creating it if new
    pub fn add_hop(&mut self, network: Ipv4Net, protocol: RoutingProtocol, next_hop: String) {
        match self.entries.iter_mut().find(|e| e.network == network) {
            Some(entry) => entry.next_hops.push(next_hop),
            None => self.entries.push(RouteEntry {
                network,
                protocol,
                next_hops: vec![next_hop],
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
