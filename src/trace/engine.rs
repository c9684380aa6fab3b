// Hop orchestrator
//
// Drives the whole trace: connect to the current device, fetch its routing
// table, resolve the best next hop, then either declare the network found,
// discover the neighbor behind the resolved interface and move on, or give
// up with a reason. Sessions are closed on every exit path, error paths
// included.

use super::{TraceOutcome, TraceReport, TraceState};
use crate::discovery::neighbor::discover_next_device;
use crate::error::{TraceError, TraceResult};
use crate::routes::lookup::{resolve_next_hop, HopResult};
use crate::routes::parser::parse_route_table;
use crate::session::{command_rejected, Credentials, DeviceSession, DeviceType, SessionFactory};
use ipnet::Ipv4Net;

const ROUTE_TABLE_COMMAND: &str = "show ip route";

/// What one hop decided
enum HopStep {
    /// Target is directly connected on the current device
    Done { interface: String },
    /// Continue the trace on another device
    Next {
        device: String,
        device_type: DeviceType,
        interface: String,
    },
}

/// Recursive multi-hop tracer over any session transport
pub struct TraceEngine<F: SessionFactory> {
    factory: F,
    credentials: Credentials,
}

impl<F: SessionFactory> TraceEngine<F> {
    pub fn new(factory: F, credentials: Credentials) -> Self {
        TraceEngine {
            factory,
            credentials,
        }
    }

    /// Trace `target` starting from `start_device` until it is proven
    /// directly connected somewhere or the path runs out.
    pub async fn trace(
        &self,
        start_device: &str,
        start_type: DeviceType,
        target: Ipv4Net,
    ) -> TraceReport {
        let mut state = TraceState::new(target, start_device.to_string(), start_type);

        loop {
            // cycle guard: two devices routing the same network at each
            // other would otherwise recurse forever
            if !state.visited.insert(state.device.clone()) {
                let err = TraceError::CycleDetected(state.device.clone());
                tracing::error!(device = %state.device, "{}", err);
                return self.failure(state, &err);
            }

            tracing::info!(device = %state.device, target = %state.target, "connecting");
            let mut session = match self
                .factory
                .open(&state.device, &self.credentials, state.device_type)
                .await
            {
                Ok(session) => session,
                Err(err) => {
                    tracing::error!(device = %state.device, "{}", err);
                    return self.failure(state, &err);
                }
            };

            let step = self.run_hop(&mut session, &state).await;
            // the session never outlives the hop, success or not
            session.close().await;

            match step {
                Ok(HopStep::Done { interface }) => {
                    tracing::info!(
                        device = %state.device,
                        interface = %interface,
                        "network {} is directly connected",
                        state.target
                    );
                    let device = state.device.clone();
                    state.record_hop(None);
                    return TraceReport {
                        target: state.target,
                        outcome: TraceOutcome::Success { device, interface },
                        hops: state.hops,
                    };
                }
                Ok(HopStep::Next {
                    device,
                    device_type,
                    interface,
                }) => {
                    tracing::info!(
                        from = %state.device,
                        to = %device,
                        interface = %interface,
                        "next hop discovered"
                    );
                    state.record_hop(Some(interface));
                    state.device = device;
                    state.device_type = device_type;
                }
                Err(err) => {
                    tracing::error!(device = %state.device, "{}", err);
                    return self.failure(state, &err);
                }
            }
        }
    }

    /// One full hop against an open session: fetch, resolve, discover
    async fn run_hop(&self, session: &mut F::Session, state: &TraceState) -> TraceResult<HopStep> {
        tracing::info!(device = %state.device, "collecting routing table");
        let raw_table = session.send(ROUTE_TABLE_COMMAND).await?;
        if command_rejected(&raw_table) {
            return Err(TraceError::CommandRejected(ROUTE_TABLE_COMMAND.to_string()));
        }

        let table = parse_route_table(&raw_table);
        tracing::debug!(entries = table.len(), "routing table parsed");

        match resolve_next_hop(state.target, &table) {
            HopResult::Terminal { interface } => Ok(HopStep::Done { interface }),
            HopResult::Unreachable { reason } => {
                Err(TraceError::NoRouteFound(reason))
            }
            HopResult::NextHop {
                interface,
                resolved_target,
            } => {
                let record =
                    discover_next_device(session, &state.device, &interface, resolved_target)
                        .await?;
                let device = record.remote_device_address.ok_or_else(|| {
                    TraceError::NeighborNotFound {
                        device: state.device.clone(),
                        interface: record.interface.clone(),
                    }
                })?;
                Ok(HopStep::Next {
                    device,
                    // unrecognized platform markers fall back to the
                    // default family
                    device_type: record.remote_device_type.unwrap_or(DeviceType::DEFAULT),
                    interface: record.interface,
                })
            }
        }
    }

    fn failure(&self, mut state: TraceState, err: &TraceError) -> TraceReport {
        // a failed login proves nothing about the path walked so far
        if matches!(err, TraceError::Authentication(_)) {
            state.hops.clear();
        }
        TraceReport {
            target: state.target,
            outcome: TraceOutcome::Failure {
                reason: err.user_message(),
            },
            hops: state.hops,
        }
    }
}
