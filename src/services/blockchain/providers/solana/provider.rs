//! Solana provider implementation.
//!
//! Lists the recent signatures of an address and inspects the balance changes of
//! each confirmed transaction for lamport and SPL token receipts.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::instrument;

use crate::{
	models::{Network, ScannedBlocks, WalletMonitorResult},
	services::blockchain::{
		provider::{now_timestamp, run_scan, ChainProvider, WalletScan},
		providers::{
			rpc_result,
			solana_helpers::{
				extract_inbound_transfers, is_valid_solana_address, normalize_solana_address,
				NativeAsset,
			},
		},
		transports::{BlockchainTransport, HttpTransportClient},
		ProviderError,
	},
};

const TEST_CONNECTION_PAYLOAD: &str =
	r#"{"id":1,"jsonrpc":"2.0","method":"getEpochInfo","params":[]}"#;

/// A confirmed signature selected for inspection
#[derive(Debug, Clone, PartialEq)]
struct SignatureCandidate {
	signature: String,
	slot: u64,
	block_time: Option<i64>,
}

/// Provider implementation for Solana
#[derive(Clone)]
pub struct SolanaProvider<T: Send + Sync + Clone> {
	/// The underlying transport client for RPC communication
	transport: T,
	/// Network configuration (native asset, signature lookback)
	network: Network,
	/// Wall-clock bound of a single scan
	scan_timeout: Duration,
}

impl<T: Send + Sync + Clone> SolanaProvider<T> {
	/// Creates a new Solana provider instance with a specific transport client
	pub fn new_with_transport(transport: T, network: &Network, scan_timeout: Duration) -> Self {
		Self {
			transport,
			network: network.clone(),
			scan_timeout,
		}
	}
}

impl SolanaProvider<HttpTransportClient> {
	/// Creates a new Solana provider talking JSON-RPC over HTTP
	///
	/// # Arguments
	/// * `network` - Network configuration containing RPC endpoints
	/// * `scan_timeout` - Wall-clock bound of a single scan
	pub fn new(network: &Network, scan_timeout: Duration) -> Result<Self, ProviderError> {
		let transport = HttpTransportClient::new(network, TEST_CONNECTION_PAYLOAD)
			.map_err(|e| ProviderError::connection_error(e.to_string()))?;
		Ok(Self::new_with_transport(transport, network, scan_timeout))
	}
}

impl<T: Send + Sync + Clone + BlockchainTransport> SolanaProvider<T> {
	async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, ProviderError> {
		let response = self.transport.send_raw_request(method, params).await?;
		rpc_result(method, response)
	}

	/// Retrieves the current slot
	async fn get_slot(&self) -> Result<u64, ProviderError> {
		self.call("getSlot", None)
			.await?
			.as_u64()
			.ok_or_else(|| ProviderError::request_error("Invalid getSlot result"))
	}

	/// Lists the most recent signatures involving the address
	///
	/// Failed transactions and, when `from_slot` is given, transactions older than it
	/// are dropped.
	async fn get_signature_candidates(
		&self,
		address: &str,
		from_slot: Option<u64>,
	) -> Result<Vec<SignatureCandidate>, ProviderError> {
		let result = self
			.call(
				"getSignaturesForAddress",
				Some(json!([address, {"limit": self.network.lookback}])),
			)
			.await?;
		let entries = result
			.as_array()
			.ok_or_else(|| ProviderError::request_error("Invalid getSignaturesForAddress result"))?;

		Ok(entries
			.iter()
			.filter(|entry| entry.get("err").map_or(true, Value::is_null))
			.filter_map(|entry| {
				Some(SignatureCandidate {
					signature: entry.get("signature")?.as_str()?.to_string(),
					slot: entry.get("slot")?.as_u64()?,
					block_time: entry.get("blockTime").and_then(Value::as_i64),
				})
			})
			.filter(|candidate| from_slot.map_or(true, |from| candidate.slot >= from))
			.collect())
	}

	/// Fetches a transaction in `jsonParsed` encoding
	async fn get_transaction(&self, signature: &str) -> Result<Value, ProviderError> {
		let transaction = self
			.call(
				"getTransaction",
				Some(json!([
					signature,
					{"encoding": "jsonParsed", "maxSupportedTransactionVersion": 0}
				])),
			)
			.await?;
		if transaction.is_null() {
			return Err(ProviderError::transaction_error(format!(
				"Transaction {} not found",
				signature
			)));
		}
		Ok(transaction)
	}

	async fn scan(&self, wallet: &str, from_slot: Option<u64>) -> Result<WalletScan, ProviderError> {
		let current_slot = self.get_slot().await?;
		let candidates = self.get_signature_candidates(wallet, from_slot).await?;
		let native = NativeAsset {
			symbol: self.network.native_symbol.clone(),
			decimals: self.network.native_decimals,
		};

		let mut transactions = Vec::new();
		for candidate in candidates {
			let transaction = match self.get_transaction(&candidate.signature).await {
				Ok(transaction) => transaction,
				Err(e) => {
					tracing::warn!(signature = %candidate.signature, error = %e, "Skipping transaction");
					continue;
				}
			};
			if transaction
				.pointer("/meta/err")
				.is_some_and(|err| !err.is_null())
			{
				continue;
			}

			let timestamp = transaction
				.get("blockTime")
				.and_then(Value::as_i64)
				.or(candidate.block_time)
				.unwrap_or_else(now_timestamp);

			match extract_inbound_transfers(
				&transaction,
				wallet,
				&candidate.signature,
				candidate.slot,
				timestamp,
				current_slot.saturating_sub(candidate.slot),
				&native,
			) {
				Ok(transfers) => transactions.extend(transfers),
				Err(e) => {
					tracing::warn!(signature = %candidate.signature, error = %e, "Skipping transaction")
				}
			}
		}

		Ok(WalletScan {
			transactions,
			scanned_blocks: ScannedBlocks::default(),
		})
	}
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> ChainProvider for SolanaProvider<T> {
	fn is_valid_address(&self, address: &str) -> bool {
		is_valid_solana_address(address)
	}

	fn normalize_address(&self, address: &str) -> String {
		normalize_solana_address(address)
	}

	async fn test_connection(&self) -> bool {
		match self.call("getEpochInfo", None).await {
			Ok(info) => info.get("absoluteSlot").is_some(),
			Err(e) => {
				tracing::warn!(chain = %self.network.slug, error = %e, "Connection test failed");
				false
			}
		}
	}

	#[instrument(skip(self), fields(chain = %self.network.slug))]
	async fn monitor_wallet_transactions(
		&self,
		address: &str,
		from_block: Option<u64>,
	) -> WalletMonitorResult {
		if !is_valid_solana_address(address) {
			return WalletMonitorResult::error(
				address,
				format!("Invalid {} address", self.network.name),
				None,
			);
		}

		let wallet = normalize_solana_address(address);
		run_scan(&wallet, self.scan_timeout, self.scan(&wallet, from_block)).await
	}
}
