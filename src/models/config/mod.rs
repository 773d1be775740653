//! Configuration loading and validation.
//!
//! Networks are configured from environment variables, one RPC endpoint variable per
//! supported chain. A chain without a configured endpoint is simply not monitored.

mod error;
mod monitor_config;
mod network_config;

pub use error::ConfigError;
pub use monitor_config::{MonitorConfig, DEFAULT_SCAN_TIMEOUT_SECS};
