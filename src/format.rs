// Number formatting shared by the snapshot models

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Render a byte count with one decimal and a binary unit, e.g. `"512.0 MB"`.
/// Values past the TB range are expressed in PB.
pub fn bytes_to_human(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in BYTE_UNITS {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} PB")
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Bytes to mebibytes, rounded to one decimal.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    round_to(bytes as f64 / (1024.0 * 1024.0), 1)
}
