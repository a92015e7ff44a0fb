// Snapshot payload models (JSON wire format of /api/stats)

mod network;
mod process;
mod sensors;
mod storage;
mod system;

pub use network::{NetworkStats, NicCounters};
pub use process::ProcessEntry;
pub use sensors::{BatteryStats, GpuStats};
pub use storage::{DiskHuman, DiskStats};
pub use system::{CpuStats, MemoryHuman, MemoryStats, StatsSnapshot, SystemStats};
