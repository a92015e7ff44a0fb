use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub sensors: SensorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Blocking window for the aggregate CPU percent; 0 reuses the previous refresh.
    pub cpu_window_ms: u64,
    pub top_processes: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            cpu_window_ms: 100,
            top_processes: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    /// Fallback GPU probe; must print `name, util, used MB, total MB, temp` CSV.
    pub gpu_command: String,
    /// Upper bound for any external sensor command.
    pub gpu_probe_timeout_ms: u64,
    /// Root of the sysfs tree used for DRM and power-supply lookups.
    pub sysfs_root: String,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            gpu_command: "nvidia-smi".into(),
            gpu_probe_timeout_ms: 1000,
            sysfs_root: "/sys".into(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("read config {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.sampling.top_processes > 0,
            "sampling.top_processes must be > 0, got {}",
            self.sampling.top_processes
        );
        anyhow::ensure!(
            !self.sensors.gpu_command.is_empty(),
            "sensors.gpu_command must be non-empty"
        );
        anyhow::ensure!(
            self.sensors.gpu_probe_timeout_ms > 0,
            "sensors.gpu_probe_timeout_ms must be > 0, got {}",
            self.sensors.gpu_probe_timeout_ms
        );
        anyhow::ensure!(
            !self.sensors.sysfs_root.is_empty(),
            "sensors.sysfs_root must be non-empty"
        );
        Ok(())
    }
}
