// Top-N process ranking by CPU usage

use tracing::debug;

use crate::format::{bytes_to_mb, round_to};
use crate::models::ProcessEntry;
use crate::sysinfo_repo::ProcessReading;

/// Busiest `n` processes, highest `cpu_percent` first. Failed per-process reads are
/// dropped; equal CPU keeps enumeration order.
pub fn top_by_cpu<I>(readings: I, n: usize) -> Vec<ProcessEntry>
where
    I: IntoIterator<Item = anyhow::Result<ProcessReading>>,
{
    let mut entries: Vec<ProcessEntry> = readings
        .into_iter()
        .filter_map(|reading| match reading {
            Ok(p) => Some(ProcessEntry {
                pid: p.pid,
                name: p.name,
                cpu_percent: round_to(p.cpu_percent.unwrap_or(0.0) as f64, 1),
                memory_mb: bytes_to_mb(p.rss_bytes.unwrap_or(0)),
            }),
            Err(e) => {
                debug!(error = %e, "skipping unreadable process");
                None
            }
        })
        .collect();
    // sort_by is stable
    entries.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    entries.truncate(n);
    entries
}
