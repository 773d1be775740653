//! Domain models and data structures for wallet monitoring.
//!
//! This module contains all the core data structures used throughout the application:
//!
//! - `blockchain`: Supported blockchain families
//! - `config`: Configuration loading and validation
//! - `core`: Core domain models (Network, Transaction, WalletMonitorResult)

mod blockchain;
mod config;
mod core;

pub use blockchain::ChainType;

pub use core::{
	Network, RpcUrl, ScannedBlocks, Transaction, TransactionType, WalletMonitorResult,
	WalletMonitorStatus, UNKNOWN_SENDER,
};

pub use config::{ConfigError, MonitorConfig, DEFAULT_SCAN_TIMEOUT_SECS};
