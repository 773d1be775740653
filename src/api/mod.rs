//! HTTP API exposing the blockchain manager.
//!
//! - `POST /api/monitor`: scan a wallet
//! - `GET /api/chains`: list the supported chains
//! - `GET /api/health`: probe every chain

mod server;

pub use server::{configure, create_api_server, MonitorRequest};
