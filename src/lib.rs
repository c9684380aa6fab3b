// Network path tracer
//
// Traces a network to the device it is directly connected to by walking
// routing tables hop by hop: parse the table, longest-prefix match the
// target, discover the neighbor behind the chosen interface, move on.

pub mod config;
pub mod discovery;
pub mod error;
pub mod routes;
pub mod session;
pub mod trace;

pub use error::{TraceError, TraceResult};
pub use routes::lookup::{resolve_next_hop, HopResult};
pub use routes::parser::parse_route_table;
pub use routes::{RouteEntry, RouteTable, RoutingProtocol};
pub use session::replay::ReplayBook;
pub use session::{Credentials, DeviceSession, DeviceType, SessionFactory};
pub use trace::engine::TraceEngine;
pub use trace::{HopRecord, TraceOutcome, TraceReport};
