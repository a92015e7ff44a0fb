// Shared test helpers: a scripted host source and composer wiring

#![allow(dead_code)]

use hoststats::composer::{ComposerOptions, StatsComposer};
use hoststats::models::{NicCounters, SystemStats};
use hoststats::rate_tracker::CounterSample;
use hoststats::sensors::SensorResolver;
use hoststats::sysinfo_repo::{CpuReading, HostSource, ProcessReading, UsageReading};
use std::collections::BTreeMap;
use std::time::Duration;

pub type CounterScript = Box<dyn FnMut(u64) -> anyhow::Result<CounterSample> + Send>;

pub fn sample(sent: u64, recv: u64, read: u64, written: u64, timestamp: f64) -> CounterSample {
    CounterSample {
        sent_bytes: sent,
        received_bytes: recv,
        read_bytes: read,
        written_bytes: written,
        timestamp,
    }
}

/// Host source whose counters come from a script keyed by read index (0 = baseline read).
pub struct FakeSource {
    counters: CounterScript,
    reads: u64,
    pub fail_memory: bool,
    pub fail_interfaces: bool,
    /// (pid, name, cpu %) per process; `None` is a process that vanished mid-read.
    pub processes: Vec<Option<(u32, &'static str, f32)>>,
}

impl FakeSource {
    pub fn new(counters: impl FnMut(u64) -> anyhow::Result<CounterSample> + Send + 'static) -> Self {
        Self {
            counters: Box::new(counters),
            reads: 0,
            fail_memory: false,
            fail_interfaces: false,
            processes: vec![
                Some((1, "init", 0.5)),
                Some((42, "postgres", 35.0)),
                None,
                Some((77, "cargo", 80.25)),
            ],
        }
    }

    /// Counters from a fixed list; reading past the end is an error.
    pub fn scripted(samples: Vec<CounterSample>) -> Self {
        Self::new(move |i| {
            samples
                .get(i as usize)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("counter script exhausted at read {}", i))
        })
    }
}

impl HostSource for FakeSource {
    fn begin_cpu_sample(&mut self) {}

    fn cpu(&mut self) -> anyhow::Result<CpuReading> {
        Ok(CpuReading {
            usage_percent: 23.456,
            per_core: vec![10.04, 36.87],
            frequency_mhz: Some(2_400),
            logical_cores: 2,
            physical_cores: Some(1),
        })
    }

    fn memory(&mut self) -> anyhow::Result<UsageReading> {
        anyhow::ensure!(!self.fail_memory, "meminfo unreadable");
        Ok(UsageReading {
            total: 8 * 1024 * 1024 * 1024,
            used: 2 * 1024 * 1024 * 1024,
            available: 6 * 1024 * 1024 * 1024,
        })
    }

    fn root_disk(&mut self) -> anyhow::Result<UsageReading> {
        Ok(UsageReading {
            total: 1024 * 1024 * 1024 * 1024,
            used: 256 * 1024 * 1024 * 1024,
            available: 768 * 1024 * 1024 * 1024,
        })
    }

    fn counters(&mut self) -> anyhow::Result<CounterSample> {
        let i = self.reads;
        self.reads += 1;
        (self.counters)(i)
    }

    fn interfaces(&mut self) -> anyhow::Result<BTreeMap<String, NicCounters>> {
        anyhow::ensure!(!self.fail_interfaces, "netlink unavailable");
        Ok(BTreeMap::from([(
            "eth0".to_string(),
            NicCounters {
                bytes_sent: 3000,
                bytes_recv: 2500,
                packets_sent: 30,
                packets_recv: 25,
            },
        )]))
    }

    fn processes(&mut self) -> Vec<anyhow::Result<ProcessReading>> {
        self.processes
            .iter()
            .map(|p| match p {
                Some((pid, name, cpu)) => Ok(ProcessReading {
                    pid: *pid,
                    name: name.to_string(),
                    cpu_percent: Some(*cpu),
                    rss_bytes: Some(64 * 1024 * 1024),
                }),
                None => Err(anyhow::anyhow!("no such process")),
            })
            .collect()
    }

    fn identity(&mut self) -> SystemStats {
        SystemStats {
            hostname: "testhost".into(),
            os: "Linux".into(),
            os_version: "12".into(),
            kernel_version: "6.1.0".into(),
            platform: "Linux 12 Debian".into(),
            machine: "x86_64".into(),
            processor: "Test CPU".into(),
            server_version: hoststats::version::VERSION.into(),
            boot_time: 1_700_000_000,
            uptime_seconds: 3600,
        }
    }
}

pub fn test_options() -> ComposerOptions {
    ComposerOptions {
        cpu_window: Duration::ZERO,
        top_processes: 5,
    }
}

/// Composer over `source` with no sensor probes (GPU and battery always absent).
pub fn composer(source: FakeSource) -> StatsComposer {
    StatsComposer::new(
        Box::new(source),
        SensorResolver::new("gpu"),
        SensorResolver::new("battery"),
        test_options(),
    )
}
