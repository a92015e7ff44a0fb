// GPU probes: DRM sysfs device enumeration and an external CSV command

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{SensorProbe, read_number, read_trimmed, sorted_entries};
use crate::format::{bytes_to_mb, round_to};
use crate::models::GpuStats;

/// Arguments for `nvidia-smi`: one CSV line of name, util %, used MB, total MB, temp °C.
pub const NVIDIA_SMI_ARGS: [&str; 2] = [
    "--query-gpu=name,utilization.gpu,memory.used,memory.total,temperature.gpu",
    "--format=csv,noheader,nounits",
];

/// Reads the first DRM card that exposes load and VRAM counters (amdgpu and friends).
pub struct DrmGpuProbe {
    drm_dir: PathBuf,
}

impl DrmGpuProbe {
    pub fn new(sysfs_root: impl AsRef<Path>) -> Self {
        Self {
            drm_dir: sysfs_root.as_ref().join("class").join("drm"),
        }
    }

    /// `cardN` device dirs with a load counter, in card index order.
    async fn devices(&self) -> anyhow::Result<Vec<(String, PathBuf)>> {
        let mut cards: Vec<(u32, String, PathBuf)> = Vec::new();
        for (name, path) in sorted_entries(&self.drm_dir).await? {
            let Some(index) = name.strip_prefix("card").and_then(|n| n.parse::<u32>().ok()) else {
                continue;
            };
            let device = path.join("device");
            if tokio::fs::try_exists(device.join("gpu_busy_percent"))
                .await
                .unwrap_or(false)
            {
                cards.push((index, name, device));
            }
        }
        cards.sort_by_key(|(index, _, _)| *index);
        Ok(cards.into_iter().map(|(_, name, dev)| (name, dev)).collect())
    }

    async fn read_device(card: &str, device: &Path) -> anyhow::Result<GpuStats> {
        let load: f64 = read_number(&device.join("gpu_busy_percent")).await?;
        let used: u64 = read_number(&device.join("mem_info_vram_used")).await?;
        let total: u64 = read_number(&device.join("mem_info_vram_total")).await?;
        Ok(GpuStats {
            name: Self::device_name(card, device).await,
            load_percent: round_to(load, 1),
            memory_used_mb: bytes_to_mb(used),
            memory_total_mb: bytes_to_mb(total),
            temperature_c: Self::temperature(device).await,
        })
    }

    async fn device_name(card: &str, device: &Path) -> String {
        if let Ok(name) = read_trimmed(&device.join("product_name")).await
            && !name.is_empty()
        {
            return name;
        }
        if let Ok(uevent) = read_trimmed(&device.join("uevent")).await
            && let Some(driver) = uevent.lines().find_map(|l| l.strip_prefix("DRIVER="))
        {
            return format!("{} ({})", driver, card);
        }
        card.to_string()
    }

    /// First hwmon `temp1_input`, millidegrees → °C.
    async fn temperature(device: &Path) -> Option<f64> {
        let hwmons = sorted_entries(&device.join("hwmon")).await.ok()?;
        for (_, hwmon) in hwmons {
            if let Ok(milli) = read_number::<f64>(&hwmon.join("temp1_input")).await {
                return Some(round_to(milli / 1000.0, 1));
            }
        }
        None
    }
}

impl SensorProbe<GpuStats> for DrmGpuProbe {
    fn name(&self) -> &'static str {
        "drm-sysfs"
    }

    fn probe(&self) -> BoxFuture<'_, anyhow::Result<Option<GpuStats>>> {
        async move {
            let devices = self.devices().await?;
            match devices.first() {
                Some((card, device)) => Ok(Some(Self::read_device(card, device).await?)),
                None => Ok(None),
            }
        }
        .boxed()
    }
}

/// Runs a command printing one `name, util, used MB, total MB, temp` CSV line.
/// The child is killed if it outlives `timeout`.
pub struct CommandGpuProbe {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandGpuProbe {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn nvidia_smi(program: impl Into<String>, timeout: Duration) -> Self {
        Self::new(
            program,
            NVIDIA_SMI_ARGS.iter().map(|a| a.to_string()).collect(),
            timeout,
        )
    }
}

impl SensorProbe<GpuStats> for CommandGpuProbe {
    fn name(&self) -> &'static str {
        "command"
    }

    fn probe(&self) -> BoxFuture<'_, anyhow::Result<Option<GpuStats>>> {
        async move {
            let mut cmd = Command::new(&self.program);
            cmd.args(&self.args)
                .stdin(Stdio::null())
                .kill_on_drop(true);
            let output = tokio::time::timeout(self.timeout, cmd.output())
                .await
                .map_err(|_| anyhow::anyhow!("{} timed out after {:?}", self.program, self.timeout))?
                .map_err(|e| anyhow::anyhow!("spawn {}: {}", self.program, e))?;
            anyhow::ensure!(
                output.status.success(),
                "{} exited with {}",
                self.program,
                output.status
            );
            Ok(parse_smi_output(&String::from_utf8_lossy(&output.stdout)))
        }
        .boxed()
    }
}

/// Parse `nvidia-smi` CSV output; only the first device line is used. Fewer than five
/// fields or a non-numeric load/memory field is "no data"; an unreadable temperature
/// (e.g. `[N/A]`) is just absent.
pub fn parse_smi_output(stdout: &str) -> Option<GpuStats> {
    let line = stdout.trim().lines().next()?;
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 5 {
        return None;
    }
    Some(GpuStats {
        name: parts[0].to_string(),
        load_percent: parts[1].parse().ok()?,
        memory_used_mb: parts[2].parse().ok()?,
        memory_total_mb: parts[3].parse().ok()?,
        temperature_c: parts[4].parse().ok(),
    })
}
