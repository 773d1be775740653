//! Chain provider implementations.
//!
//! Contains one provider per chain family:
//! - EVM provider for Ethereum-compatible chains
//! - Solana provider
//! - Starknet provider
//!
//! All of them speak JSON-RPC through a `BlockchainTransport`.

mod evm {
	pub mod helpers;
	pub mod provider;
}
mod solana {
	pub mod helpers;
	pub mod provider;
}
mod starknet {
	pub mod helpers;
	pub mod provider;
}

pub use evm::{helpers as evm_helpers, provider::EvmProvider};
pub use solana::{helpers as solana_helpers, provider::SolanaProvider};
pub use starknet::{helpers as starknet_helpers, provider::StarknetProvider};

use serde_json::Value;

use crate::services::blockchain::ProviderError;

/// Extracts the `result` member of a JSON-RPC response
///
/// # Errors
/// - `RequestError` when the node answered with a JSON-RPC error object
/// - `RequestError` when the response has no `result` member
pub(crate) fn rpc_result(method: &str, response: Value) -> Result<Value, ProviderError> {
	if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
		let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
		let message = error
			.get("message")
			.and_then(Value::as_str)
			.unwrap_or("unknown error");
		return Err(ProviderError::request_error(format!(
			"{} failed with JSON-RPC error {}: {}",
			method, code, message
		)));
	}

	match response {
		Value::Object(mut map) => map.remove("result").ok_or_else(|| {
			ProviderError::request_error(format!("Missing 'result' field in {} response", method))
		}),
		_ => Err(ProviderError::request_error(format!(
			"Unexpected {} response shape",
			method
		))),
	}
}
