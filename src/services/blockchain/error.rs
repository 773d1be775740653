//! Provider error types and handling.
//!
//! Errors in this module never cross the manager boundary: providers turn them into
//! structured `WalletMonitorResult::error` values.

use crate::services::blockchain::transports::TransportError;

use log::error;

/// Represents possible errors that can occur while a provider talks to its chain
#[derive(Debug)]
pub enum ProviderError {
	/// Errors related to network connectivity issues
	ConnectionError(String),

	/// Errors related to malformed requests or invalid responses
	RequestError(String),

	/// Errors related to processing a single transaction
	TransactionError(String),
}

impl ProviderError {
	/// Formats the error message based on the error type
	fn format_message(&self) -> String {
		match self {
			Self::ConnectionError(msg) => format!("Connection error: {}", msg),
			Self::RequestError(msg) => format!("Request error: {}", msg),
			Self::TransactionError(msg) => format!("Transaction error: {}", msg),
		}
	}

	/// Creates a new connection error with logging
	pub fn connection_error(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new request error with logging
	pub fn request_error(msg: impl Into<String>) -> Self {
		let error = Self::RequestError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new transaction error
	///
	/// Not logged here: a failing transaction is skipped and the scan logs it once.
	pub fn transaction_error(msg: impl Into<String>) -> Self {
		Self::TransactionError(msg.into())
	}
}

impl std::fmt::Display for ProviderError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl std::error::Error for ProviderError {}

/// Conversion from transport errors
///
/// Failures that never reached the node are connection errors, everything else is a
/// request error.
impl From<TransportError> for ProviderError {
	fn from(err: TransportError) -> Self {
		match err {
			TransportError::Network { .. } | TransportError::UrlRotation { .. } => {
				Self::connection_error(err.to_string())
			}
			_ => Self::request_error(err.to_string()),
		}
	}
}
