//! Utility modules for common functionality.
//!
//! - http: Retrying HTTP client construction
//! - logging: Logging utilities
//! - parsing: Hex quantity parsing and amount formatting

pub mod http;
pub mod logging;
pub mod parsing;
