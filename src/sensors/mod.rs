// Best-effort hardware sensors (GPU, battery) resolved through ordered probe chains

mod battery;
mod gpu;

pub use battery::{PmsetBatteryProbe, SysfsBatteryProbe, parse_pmset_output};
pub use gpu::{CommandGpuProbe, DrmGpuProbe, NVIDIA_SMI_ARGS, parse_smi_output};

use anyhow::Context;
use futures_util::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::config::SensorsConfig;
use crate::models::{BatteryStats, GpuStats};

/// One way of reading a sensor. `Ok(None)` means "not present here"; `Err` means the
/// probe broke. Both make the resolver move on to the next probe.
pub trait SensorProbe<T>: Send + Sync {
    fn name(&self) -> &'static str;

    fn probe(&self) -> BoxFuture<'_, anyhow::Result<Option<T>>>;
}

/// Tries probes in order and returns the first reading. Never fails.
pub struct SensorResolver<T> {
    sensor: &'static str,
    probes: Vec<Box<dyn SensorProbe<T>>>,
}

impl<T> SensorResolver<T> {
    pub fn new(sensor: &'static str) -> Self {
        Self {
            sensor,
            probes: Vec::new(),
        }
    }

    pub fn with_probe(mut self, probe: impl SensorProbe<T> + 'static) -> Self {
        self.probes.push(Box::new(probe));
        self
    }

    pub fn probe_names(&self) -> Vec<&'static str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    pub async fn resolve(&self) -> Option<T> {
        for probe in &self.probes {
            match probe.probe().await {
                Ok(Some(reading)) => return Some(reading),
                Ok(None) => {
                    debug!(sensor = self.sensor, probe = probe.name(), "sensor not present");
                }
                Err(e) => {
                    debug!(sensor = self.sensor, probe = probe.name(), error = %e, "sensor probe failed");
                }
            }
        }
        None
    }
}

/// DRM sysfs first, then the NVIDIA command-line probe.
pub fn gpu_resolver(config: &SensorsConfig) -> SensorResolver<GpuStats> {
    SensorResolver::new("gpu")
        .with_probe(DrmGpuProbe::new(&config.sysfs_root))
        .with_probe(CommandGpuProbe::nvidia_smi(
            config.gpu_command.clone(),
            Duration::from_millis(config.gpu_probe_timeout_ms),
        ))
}

pub fn battery_resolver(config: &SensorsConfig) -> SensorResolver<BatteryStats> {
    let resolver = SensorResolver::new("battery").with_probe(SysfsBatteryProbe::new(&config.sysfs_root));
    if cfg!(target_os = "macos") {
        resolver.with_probe(PmsetBatteryProbe::new(Duration::from_millis(
            config.gpu_probe_timeout_ms,
        )))
    } else {
        resolver
    }
}

async fn read_trimmed(path: &Path) -> anyhow::Result<String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    Ok(raw.trim().to_string())
}

async fn read_number<N>(path: &Path) -> anyhow::Result<N>
where
    N: FromStr,
    N::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = read_trimmed(path).await?;
    raw.parse::<N>()
        .with_context(|| format!("parse {} ({:?})", path.display(), raw))
}

/// Directory entries sorted by name; a missing directory is an empty list.
async fn sorted_entries(dir: &Path) -> anyhow::Result<Vec<(String, PathBuf)>> {
    let mut reader = match tokio::fs::read_dir(dir).await {
        Ok(r) => r,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("list {}", dir.display())),
    };
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        entries.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Outcome {
        Reading(u32),
        Absent,
        Broken,
    }

    struct CountingProbe {
        outcome: Outcome,
        calls: Arc<AtomicUsize>,
    }

    impl CountingProbe {
        fn new(outcome: Outcome) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    outcome,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl SensorProbe<u32> for CountingProbe {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn probe(&self) -> BoxFuture<'_, anyhow::Result<Option<u32>>> {
            async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                match self.outcome {
                    Outcome::Reading(v) => Ok(Some(v)),
                    Outcome::Absent => Ok(None),
                    Outcome::Broken => anyhow::bail!("probe exploded"),
                }
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn primary_reading_skips_fallback() {
        let (primary, primary_calls) = CountingProbe::new(Outcome::Reading(1));
        let (fallback, fallback_calls) = CountingProbe::new(Outcome::Reading(2));
        let resolver = SensorResolver::new("test").with_probe(primary).with_probe(fallback);
        assert_eq!(resolver.resolve().await, Some(1));
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn absent_or_broken_primary_falls_back() {
        for outcome in [Outcome::Absent, Outcome::Broken] {
            let (primary, _) = CountingProbe::new(outcome);
            let (fallback, fallback_calls) = CountingProbe::new(Outcome::Reading(2));
            let resolver = SensorResolver::new("test").with_probe(primary).with_probe(fallback);
            assert_eq!(resolver.resolve().await, Some(2));
            assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn exhausted_chain_is_absent() {
        let (primary, _) = CountingProbe::new(Outcome::Broken);
        let (fallback, fallback_calls) = CountingProbe::new(Outcome::Absent);
        let resolver = SensorResolver::new("test").with_probe(primary).with_probe(fallback);
        assert_eq!(resolver.resolve().await, None);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        assert_eq!(SensorResolver::<u32>::new("empty").resolve().await, None);
    }

    #[test]
    fn gpu_resolver_orders_sysfs_before_command() {
        let config = SensorsConfig::default();
        assert_eq!(gpu_resolver(&config).probe_names(), vec!["drm-sysfs", "command"]);
    }
}
