// Trace module - hop orchestration and trace results

pub mod engine;

use crate::session::DeviceType;
use ipnet::Ipv4Net;
use serde::Serialize;
use std::collections::HashSet;

/// One hop the trace walked through
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HopRecord {
    pub device: String,
    pub device_type: DeviceType,
    /// Interface the trace left this device through; None on the terminal
    /// device (the network lives there)
    pub interface: Option<String>,
}

/// Final outcome of a trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TraceOutcome {
    /// The target network is directly connected to `device` on `interface`
    Success { device: String, interface: String },
    Failure { reason: String },
}

/// What the caller gets back: the outcome plus every hop completed along
/// the way, failures included
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceReport {
    pub target: Ipv4Net,
    pub outcome: TraceOutcome,
    pub hops: Vec<HopRecord>,
}

impl TraceReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, TraceOutcome::Success { .. })
    }
}

/// Mutable per-trace state, owned by the engine for the life of one trace
#[derive(Debug)]
pub(crate) struct TraceState {
    pub target: Ipv4Net,
    pub device: String,
    pub device_type: DeviceType,
    pub visited: HashSet<String>,
    pub hops: Vec<HopRecord>,
}

impl TraceState {
    pub fn new(target: Ipv4Net, device: String, device_type: DeviceType) -> Self {
        TraceState {
            target,
            device,
            device_type,
            visited: HashSet::new(),
            hops: Vec::new(),
        }
    }

    pub fn record_hop(&mut self, interface: Option<String>) {
        self.hops.push(HopRecord {
            device: self.device.clone(),
            device_type: self.device_type,
            interface,
        });
    }
}
