// Build-time identity from Cargo.toml

/// Package version; also reported as `system.server_version` in snapshots.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
