// Root filesystem usage and throughput

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskHuman {
    pub total: String,
    pub used: String,
    pub free: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskStats {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub percent: f64,
    pub read_bps: Option<f64>,
    pub write_bps: Option<f64>,
    pub human: DiskHuman,
}
