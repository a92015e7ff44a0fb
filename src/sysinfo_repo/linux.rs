// Linux-specific helpers: /proc and /sys readers.

/// Read first "model name" from /proc/cpuinfo (Linux). Prefer over sysinfo when it returns "cpu0" etc.
pub(super) fn read_cpu_model_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty() && *s != "cpu0")?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Cumulative (read, written) bytes over whole block devices from /proc/diskstats (Linux).
/// Partitions are skipped so their I/O is not counted twice.
pub(super) fn read_disk_io_linux() -> Option<(u64, u64)> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/diskstats").ok()?;
        Some(parse_diskstats(&content, |name| {
            std::path::Path::new("/sys/block").join(name).exists()
        }))
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Sector counts in /proc/diskstats are always 512-byte units, whatever the device's block size.
const DISKSTATS_SECTOR_SIZE: u64 = 512;

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(super) fn parse_diskstats(content: &str, is_whole_device: impl Fn(&str) -> bool) -> (u64, u64) {
    let mut read = 0u64;
    let mut written = 0u64;
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 || !is_whole_device(fields[2]) {
            continue;
        }
        let sectors_read = fields[5].parse::<u64>().unwrap_or(0);
        let sectors_written = fields[9].parse::<u64>().unwrap_or(0);
        read = read.saturating_add(sectors_read * DISKSTATS_SECTOR_SIZE);
        written = written.saturating_add(sectors_written * DISKSTATS_SECTOR_SIZE);
    }
    (read, written)
}
