// CPU, memory, host identity and the snapshot root

use serde::{Deserialize, Serialize};

use super::{BatteryStats, DiskStats, GpuStats, NetworkStats, ProcessEntry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuStats {
    /// Aggregate usage over the sampling window, one decimal.
    pub percent: f64,
    /// Usage per logical core, aligned to core index.
    pub per_core: Vec<f64>,
    pub frequency_ghz: Option<f64>,
    pub logical_cores: usize,
    pub physical_cores: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryHuman {
    pub total: String,
    pub used: String,
    pub available: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
    pub percent: f64,
    pub human: MemoryHuman,
}

/// Static-ish host identity, re-read on every snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub hostname: String,
    pub os: String,
    pub os_version: String,
    pub kernel_version: String,
    pub platform: String,
    pub machine: String,
    pub processor: String,
    pub server_version: String,
    /// Seconds since the UNIX epoch.
    pub boot_time: u64,
    pub uptime_seconds: u64,
}

/// Everything returned by `GET /api/stats`. `gpu` and `battery` are `null` when the host
/// has no such sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub timestamp: f64,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub disk: DiskStats,
    pub network: NetworkStats,
    pub gpu: Option<GpuStats>,
    pub processes_top: Vec<ProcessEntry>,
    pub battery: Option<BatteryStats>,
    pub system: SystemStats,
}
