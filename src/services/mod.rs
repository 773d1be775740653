//! Core services implementing the wallet monitoring functionality.
//!
//! This module contains the service layer:
//! - blockchain: Chain providers, transports and the blockchain manager

pub mod blockchain;
