//! Core domain models for the wallet monitor.
//!
//! This module contains the fundamental data structures that represent:
//! - Networks: Blockchain network definitions and connection details
//! - Transactions: Inbound transfers detected for a monitored wallet
//! - Results: The outcome of a single monitor call

mod network;
mod result;
mod transaction;

pub use network::{Network, RpcUrl};
pub use result::{ScannedBlocks, WalletMonitorResult, WalletMonitorStatus};
pub use transaction::{Transaction, TransactionType, UNKNOWN_SENDER};
