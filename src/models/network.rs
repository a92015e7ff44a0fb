// Network interface models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cumulative counters for one interface since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    /// Keyed by interface name; empty when interfaces could not be enumerated.
    pub interfaces: BTreeMap<String, NicCounters>,
    pub upload_bps: Option<f64>,
    pub download_bps: Option<f64>,
}
