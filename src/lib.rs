// Library for tests to access modules

pub mod composer;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod processes;
pub mod rate_tracker;
pub mod routes;
pub mod sensors;
pub mod sysinfo_repo;
pub mod version;
