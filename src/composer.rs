// Snapshot composition: one lock around every host read and the rate update.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use crate::config::SamplingConfig;
use crate::error::StatsError;
use crate::format::{bytes_to_human, round_to};
use crate::models::*;
use crate::processes::top_by_cpu;
use crate::rate_tracker::{CounterSample, RateTracker, Rates};
use crate::sensors::SensorResolver;
use crate::sysinfo_repo::{CpuReading, HostSource, UsageReading};

#[derive(Debug, Clone, Copy)]
pub struct ComposerOptions {
    pub cpu_window: Duration,
    pub top_processes: usize,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        (&SamplingConfig::default()).into()
    }
}

impl From<&SamplingConfig> for ComposerOptions {
    fn from(config: &SamplingConfig) -> Self {
        Self {
            cpu_window: Duration::from_millis(config.cpu_window_ms),
            top_processes: config.top_processes,
        }
    }
}

struct ComposerState {
    source: Box<dyn HostSource>,
    rates: RateTracker,
}

/// Synchronous part of a snapshot, read on a blocking thread.
struct HostReadings {
    cpu: CpuReading,
    memory: UsageReading,
    disk: UsageReading,
    counters: CounterSample,
    rates: Rates,
    interfaces: BTreeMap<String, NicCounters>,
    processes: Vec<ProcessEntry>,
    system: SystemStats,
}

impl ComposerState {
    fn read_host(&mut self, options: ComposerOptions) -> Result<HostReadings, StatsError> {
        let source = self.source.as_mut();
        source.begin_cpu_sample();
        if !options.cpu_window.is_zero() {
            std::thread::sleep(options.cpu_window);
        }
        let cpu = source.cpu().map_err(StatsError::gauge("cpu"))?;
        let memory = source.memory().map_err(StatsError::gauge("memory"))?;
        let disk = source.root_disk().map_err(StatsError::gauge("disk"))?;
        let counters = source
            .counters()
            .map_err(StatsError::gauge("I/O counters"))?;
        let rates = self.rates.update(counters);
        let interfaces = source.interfaces().unwrap_or_else(|e| {
            warn!(error = %e, "network interfaces unavailable");
            BTreeMap::new()
        });
        let processes = top_by_cpu(source.processes(), options.top_processes);
        let system = source.identity();
        Ok(HostReadings {
            cpu,
            memory,
            disk,
            counters,
            rates,
            interfaces,
            processes,
            system,
        })
    }
}

/// Builds [`StatsSnapshot`]s. Callers are serialized: the whole composition, sensor
/// probes included, runs under a single lock so rates always pair one caller's sample
/// with the sample stored by the caller before it.
pub struct StatsComposer {
    state: Arc<Mutex<ComposerState>>,
    gpu: SensorResolver<GpuStats>,
    battery: SensorResolver<BatteryStats>,
    options: ComposerOptions,
}

impl StatsComposer {
    /// Reads one counter sample as the rate baseline. If that fails the tracker starts
    /// empty and the first snapshot carries no rates.
    pub fn new(
        mut source: Box<dyn HostSource>,
        gpu: SensorResolver<GpuStats>,
        battery: SensorResolver<BatteryStats>,
        options: ComposerOptions,
    ) -> Self {
        let rates = match source.counters() {
            Ok(baseline) => RateTracker::with_baseline(baseline),
            Err(e) => {
                warn!(error = %e, "no I/O counter baseline; first snapshot has no rates");
                RateTracker::new()
            }
        };
        Self {
            state: Arc::new(Mutex::new(ComposerState { source, rates })),
            gpu,
            battery,
            options,
        }
    }

    #[instrument(skip(self), fields(operation = "compose"))]
    pub async fn compose(&self) -> Result<StatsSnapshot, StatsError> {
        let guard = self.state.clone().lock_owned().await;
        let options = self.options;
        let (guard, readings) = tokio::task::spawn_blocking(move || {
            let mut guard = guard;
            let readings = guard.read_host(options);
            (guard, readings)
        })
        .await?;
        let readings = readings?;
        let gpu = self.gpu.resolve().await;
        let battery = self.battery.resolve().await;
        drop(guard);
        Ok(build_snapshot(readings, gpu, battery))
    }
}

fn build_snapshot(
    host: HostReadings,
    gpu: Option<GpuStats>,
    battery: Option<BatteryStats>,
) -> StatsSnapshot {
    StatsSnapshot {
        timestamp: host.counters.timestamp,
        cpu: cpu_stats(host.cpu),
        memory: MemoryStats {
            total_bytes: host.memory.total,
            used_bytes: host.memory.used,
            available_bytes: host.memory.available,
            percent: round_to(host.memory.percent(), 1),
            human: MemoryHuman {
                total: bytes_to_human(host.memory.total),
                used: bytes_to_human(host.memory.used),
                available: bytes_to_human(host.memory.available),
            },
        },
        disk: DiskStats {
            total_bytes: host.disk.total,
            used_bytes: host.disk.used,
            free_bytes: host.disk.available,
            percent: round_to(host.disk.percent(), 1),
            read_bps: host.rates.read_bps,
            write_bps: host.rates.write_bps,
            human: DiskHuman {
                total: bytes_to_human(host.disk.total),
                used: bytes_to_human(host.disk.used),
                free: bytes_to_human(host.disk.available),
            },
        },
        network: NetworkStats {
            interfaces: host.interfaces,
            upload_bps: host.rates.upload_bps,
            download_bps: host.rates.download_bps,
        },
        gpu,
        processes_top: host.processes,
        battery,
        system: host.system,
    }
}

fn cpu_stats(cpu: CpuReading) -> CpuStats {
    CpuStats {
        percent: round_to(cpu.usage_percent, 1),
        per_core: cpu.per_core.iter().map(|p| round_to(*p, 1)).collect(),
        frequency_ghz: cpu
            .frequency_mhz
            .filter(|mhz| *mhz > 0)
            .map(|mhz| round_to(mhz as f64 / 1000.0, 2)),
        logical_cores: cpu.logical_cores,
        physical_cores: cpu.physical_cores,
    }
}
