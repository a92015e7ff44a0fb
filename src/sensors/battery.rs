// Battery probes: sysfs power-supply class (Linux) and pmset (macOS)

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{SensorProbe, read_number, read_trimmed, sorted_entries};
use crate::format::round_to;
use crate::models::BatteryStats;

pub struct SysfsBatteryProbe {
    supply_dir: PathBuf,
}

impl SysfsBatteryProbe {
    pub fn new(sysfs_root: impl AsRef<Path>) -> Self {
        Self {
            supply_dir: sysfs_root.as_ref().join("class").join("power_supply"),
        }
    }

    /// Charge level: `capacity`, else energy or charge now/full ratio.
    async fn percent(battery: &Path) -> anyhow::Result<f64> {
        if let Ok(capacity) = read_number::<f64>(&battery.join("capacity")).await {
            return Ok(capacity);
        }
        for (now, full) in [("energy_now", "energy_full"), ("charge_now", "charge_full")] {
            if let (Ok(now), Ok(full)) = (
                read_number::<f64>(&battery.join(now)).await,
                read_number::<f64>(&battery.join(full)).await,
            ) && full > 0.0
            {
                return Ok(now / full * 100.0);
            }
        }
        anyhow::bail!("{} exposes no charge level", battery.display())
    }
}

impl SensorProbe<BatteryStats> for SysfsBatteryProbe {
    fn name(&self) -> &'static str {
        "power-supply-sysfs"
    }

    fn probe(&self) -> BoxFuture<'_, anyhow::Result<Option<BatteryStats>>> {
        async move {
            let mut battery = None;
            let mut external_online = Vec::new();
            for (_, path) in sorted_entries(&self.supply_dir).await? {
                let Ok(kind) = read_trimmed(&path.join("type")).await else {
                    continue;
                };
                match kind.as_str() {
                    "Battery" if battery.is_none() => battery = Some(path),
                    "Mains" | "USB" => {
                        let online = read_trimmed(&path.join("online")).await.ok();
                        external_online.push(online.as_deref() == Some("1"));
                    }
                    _ => {}
                }
            }
            let Some(battery) = battery else {
                return Ok(None);
            };
            let percent = Self::percent(&battery).await?.min(100.0);
            let plugged = if external_online.is_empty() {
                read_trimmed(&battery.join("status")).await.ok().as_deref() != Some("Discharging")
            } else {
                external_online.iter().any(|online| *online)
            };
            Ok(Some(BatteryStats {
                percent: round_to(percent, 1),
                plugged,
            }))
        }
        .boxed()
    }
}

/// `pmset -g batt`, bounded by `timeout`.
pub struct PmsetBatteryProbe {
    timeout: Duration,
}

impl PmsetBatteryProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl SensorProbe<BatteryStats> for PmsetBatteryProbe {
    fn name(&self) -> &'static str {
        "pmset"
    }

    fn probe(&self) -> BoxFuture<'_, anyhow::Result<Option<BatteryStats>>> {
        async move {
            let mut cmd = Command::new("pmset");
            cmd.args(["-g", "batt"]).stdin(Stdio::null()).kill_on_drop(true);
            let output = tokio::time::timeout(self.timeout, cmd.output())
                .await
                .map_err(|_| anyhow::anyhow!("pmset timed out after {:?}", self.timeout))??;
            anyhow::ensure!(output.status.success(), "pmset exited with {}", output.status);
            Ok(parse_pmset_output(&String::from_utf8_lossy(&output.stdout)))
        }
        .boxed()
    }
}

/// Parse `pmset -g batt`:
/// ```text
/// Now drawing from 'AC Power'
///  -InternalBattery-0 (id=1234)	72%; charging; 1:23 remaining present: true
/// ```
pub fn parse_pmset_output(output: &str) -> Option<BatteryStats> {
    let line = output.lines().find(|l| l.contains("InternalBattery"))?;
    let percent = line
        .split('\t')
        .nth(1)
        .and_then(|s| s.split('%').next())
        .and_then(|s| s.trim().parse::<f64>().ok())?;
    Some(BatteryStats {
        percent: round_to(percent, 1),
        plugged: output.contains("'AC Power'"),
    })
}
