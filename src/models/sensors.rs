// Optional hardware sensors

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuStats {
    pub name: String,
    pub load_percent: f64,
    pub memory_used_mb: f64,
    pub memory_total_mb: f64,
    pub temperature_c: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryStats {
    pub percent: f64,
    pub plugged: bool,
}
