//! Multi-chain wallet transaction monitor.
//!
//! Scans wallets on Starknet, EVM-compatible chains and Solana for inbound
//! transfers and reports them in a chain independent shape.
//!
//! # Modules
//! - `api`: HTTP API over the blockchain manager
//! - `models`: Transactions, results and configuration
//! - `services`: Chain providers, transports and the blockchain manager
//! - `utils`: Logging, HTTP and parsing helpers

pub mod api;
pub mod models;
pub mod services;
pub mod utils;
