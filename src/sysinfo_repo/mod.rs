// Host counters and gauges via sysinfo

mod linux;

use crate::models::{NicCounters, SystemStats};
use crate::rate_tracker::CounterSample;
use crate::version::VERSION;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use sysinfo::{Disks, Networks, ProcessesToUpdate, System};
use tracing::instrument;

/// Raw CPU reading; rounding and unit conversion happen in the composer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuReading {
    pub usage_percent: f64,
    pub per_core: Vec<f64>,
    /// 0 or `None` when the platform does not expose a frequency.
    pub frequency_mhz: Option<u64>,
    pub logical_cores: usize,
    pub physical_cores: Option<usize>,
}

/// Capacity gauge for memory or a filesystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageReading {
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

impl UsageReading {
    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            (self.used as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessReading {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: Option<f32>,
    pub rss_bytes: Option<u64>,
}

/// Everything the composer reads from the host. Calls are serialized by the caller;
/// implementations may keep refresh state between calls.
pub trait HostSource: Send {
    /// Opens the aggregate CPU window that the next `cpu()` call closes.
    fn begin_cpu_sample(&mut self);

    fn cpu(&mut self) -> anyhow::Result<CpuReading>;

    fn memory(&mut self) -> anyhow::Result<UsageReading>;

    /// Usage of the filesystem mounted at `/` (or the first mounted disk where there is none).
    fn root_disk(&mut self) -> anyhow::Result<UsageReading>;

    /// Host-wide cumulative network and disk counters, timestamped at read time.
    fn counters(&mut self) -> anyhow::Result<CounterSample>;

    fn interfaces(&mut self) -> anyhow::Result<BTreeMap<String, NicCounters>>;

    /// One entry per live process; a failed per-process read is an `Err` item.
    fn processes(&mut self) -> Vec<anyhow::Result<ProcessReading>>;

    fn identity(&mut self) -> SystemStats;
}

pub struct SysinfoRepo {
    sys: System,
    disks: Disks,
    networks: Networks,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        Self {
            sys,
            disks,
            networks,
        }
    }

    fn processor_name(&self) -> String {
        linux::read_cpu_model_linux()
            .or_else(|| {
                self.sys
                    .cpus()
                    .first()
                    .map(|c| c.brand().trim().to_string())
                    .filter(|s| !s.is_empty() && s != "cpu0")
            })
            .unwrap_or_else(|| "Unknown".into())
    }

    /// Non-Linux fallback: per-filesystem cumulative I/O as reported by sysinfo.
    fn disk_io_from_disks(&mut self) -> (u64, u64) {
        self.disks.refresh(false);
        self.disks.list().iter().fold((0u64, 0u64), |(r, w), d| {
            let usage = d.usage();
            (
                r.saturating_add(usage.total_read_bytes),
                w.saturating_add(usage.total_written_bytes),
            )
        })
    }
}

fn unix_now() -> anyhow::Result<f64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("system clock before UNIX epoch: {}", e))?;
    Ok(elapsed.as_secs_f64())
}

impl HostSource for SysinfoRepo {
    fn begin_cpu_sample(&mut self) {
        self.sys.refresh_cpu_usage();
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu"))]
    fn cpu(&mut self) -> anyhow::Result<CpuReading> {
        self.sys.refresh_cpu_all();
        let cpus = self.sys.cpus();
        anyhow::ensure!(!cpus.is_empty(), "no CPUs reported by the host");
        let frequency_mhz = cpus
            .first()
            .map(|c| c.frequency())
            .filter(|mhz| *mhz > 0);
        Ok(CpuReading {
            usage_percent: self.sys.global_cpu_usage() as f64,
            per_core: cpus.iter().map(|c| c.cpu_usage() as f64).collect(),
            frequency_mhz,
            logical_cores: cpus.len(),
            physical_cores: System::physical_core_count(),
        })
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "memory"))]
    fn memory(&mut self) -> anyhow::Result<UsageReading> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        anyhow::ensure!(total > 0, "total memory reported as 0");
        let available = self.sys.available_memory();
        Ok(UsageReading {
            total,
            used: total.saturating_sub(available),
            available,
        })
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "root_disk"))]
    fn root_disk(&mut self) -> anyhow::Result<UsageReading> {
        self.disks.refresh(false);
        let list = self.disks.list();
        let disk = list
            .iter()
            .find(|d| d.mount_point() == Path::new("/"))
            .or_else(|| list.first())
            .ok_or_else(|| anyhow::anyhow!("no mounted disks reported by the host"))?;
        let total = disk.total_space();
        let available = disk.available_space();
        Ok(UsageReading {
            total,
            used: total.saturating_sub(available),
            available,
        })
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "counters"))]
    fn counters(&mut self) -> anyhow::Result<CounterSample> {
        self.networks.refresh(true);
        let (sent_bytes, received_bytes) =
            self.networks
                .list()
                .values()
                .fold((0u64, 0u64), |(tx, rx), data| {
                    (
                        tx.saturating_add(data.total_transmitted()),
                        rx.saturating_add(data.total_received()),
                    )
                });
        let (read_bytes, written_bytes) = match linux::read_disk_io_linux() {
            Some(io) => io,
            None => self.disk_io_from_disks(),
        };
        Ok(CounterSample {
            sent_bytes,
            received_bytes,
            read_bytes,
            written_bytes,
            timestamp: unix_now()?,
        })
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "interfaces"))]
    fn interfaces(&mut self) -> anyhow::Result<BTreeMap<String, NicCounters>> {
        self.networks.refresh(true);
        Ok(self
            .networks
            .list()
            .iter()
            .map(|(name, data)| {
                (
                    name.clone(),
                    NicCounters {
                        bytes_sent: data.total_transmitted(),
                        bytes_recv: data.total_received(),
                        packets_sent: data.total_packets_transmitted(),
                        packets_recv: data.total_packets_received(),
                    },
                )
            })
            .collect())
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "processes"))]
    fn processes(&mut self) -> Vec<anyhow::Result<ProcessReading>> {
        self.sys.refresh_processes(ProcessesToUpdate::All, true);
        self.sys
            .processes()
            .values()
            // Linux reports threads alongside processes.
            .filter(|p| p.thread_kind().is_none())
            .map(|p| {
                Ok(ProcessReading {
                    pid: p.pid().as_u32(),
                    name: p.name().to_string_lossy().into_owned(),
                    cpu_percent: Some(p.cpu_usage()),
                    rss_bytes: Some(p.memory()),
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "identity"))]
    fn identity(&mut self) -> SystemStats {
        SystemStats {
            hostname: System::host_name().unwrap_or_default(),
            os: System::name().unwrap_or_else(|| std::env::consts::OS.into()),
            os_version: System::os_version().unwrap_or_default(),
            kernel_version: System::kernel_version().unwrap_or_default(),
            platform: System::long_os_version().unwrap_or_default(),
            machine: std::env::consts::ARCH.into(),
            processor: self.processor_name(),
            server_version: VERSION.into(),
            boot_time: System::boot_time(),
            uptime_seconds: System::uptime(),
        }
    }
}
