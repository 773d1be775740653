//! EVM-compatible chain provider implementation.
//!
//! Detects inbound transfers on Ethereum and other EVM-compatible chains by walking
//! the blocks of the scan window for native value transfers and contract calls, and
//! by filtering ERC-20 `Transfer` logs on the recipient topic.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::{collections::HashMap, time::Duration};
use tracing::instrument;

use crate::{
	models::{Network, ScannedBlocks, Transaction, TransactionType, WalletMonitorResult},
	services::blockchain::{
		provider::{now_timestamp, resolve_block_window, run_scan, ChainProvider, WalletScan},
		providers::{
			evm_helpers::{
				address_to_topic, checksum_address, decode_decimals, decode_symbol,
				is_valid_evm_address, parse_address, topic_to_address, DECIMALS_SELECTOR,
				SYMBOL_SELECTOR, TRANSFER_TOPIC,
			},
			rpc_result,
		},
		transports::{BlockchainTransport, HttpTransportClient},
		ProviderError,
	},
	utils::parsing::{format_units, parse_hex_u256, parse_hex_u64},
};

const TEST_CONNECTION_PAYLOAD: &str =
	r#"{"id":1,"jsonrpc":"2.0","method":"eth_blockNumber","params":[]}"#;

/// ERC-20 metadata resolved once per scan
#[derive(Debug, Clone)]
struct TokenMetadata {
	decimals: u8,
	symbol: Option<String>,
}

/// Provider implementation for Ethereum Virtual Machine (EVM) compatible chains
#[derive(Clone)]
pub struct EvmProvider<T: Send + Sync + Clone> {
	/// The underlying transport client for RPC communication
	transport: T,
	/// Network configuration (native asset, scan window)
	network: Network,
	/// Wall-clock bound of a single scan
	scan_timeout: Duration,
}

impl<T: Send + Sync + Clone> EvmProvider<T> {
	/// Creates a new EVM provider instance with a specific transport client
	pub fn new_with_transport(transport: T, network: &Network, scan_timeout: Duration) -> Self {
		Self {
			transport,
			network: network.clone(),
			scan_timeout,
		}
	}
}

impl EvmProvider<HttpTransportClient> {
	/// Creates a new EVM provider talking JSON-RPC over HTTP
	///
	/// # Arguments
	/// * `network` - Network configuration containing RPC endpoints and chain details
	/// * `scan_timeout` - Wall-clock bound of a single scan
	///
	/// # Returns
	/// * `Result<Self, ProviderError>` - New provider instance or a connection error when
	///   no endpoint is usable
	pub fn new(network: &Network, scan_timeout: Duration) -> Result<Self, ProviderError> {
		let transport = HttpTransportClient::new(network, TEST_CONNECTION_PAYLOAD)
			.map_err(|e| ProviderError::connection_error(e.to_string()))?;
		Ok(Self::new_with_transport(transport, network, scan_timeout))
	}
}

impl<T: Send + Sync + Clone + BlockchainTransport> EvmProvider<T> {
	/// Sends a request and extracts its JSON-RPC result
	async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, ProviderError> {
		let response = self.transport.send_raw_request(method, params).await?;
		rpc_result(method, response)
	}

	/// Retrieves the latest block number
	async fn get_block_number(&self) -> Result<u64, ProviderError> {
		let result = self.call("eth_blockNumber", None).await?;
		let hex = result
			.as_str()
			.ok_or_else(|| ProviderError::request_error("Invalid eth_blockNumber result"))?;
		parse_hex_u64(hex).map_err(ProviderError::request_error)
	}

	/// Retrieves a block with full transaction objects
	///
	/// Returns `None` when the node does not know the block.
	async fn get_block(&self, number: u64) -> Result<Option<Value>, ProviderError> {
		let block = self
			.call(
				"eth_getBlockByNumber",
				Some(json!([format!("0x{:x}", number), true])),
			)
			.await?;
		Ok((!block.is_null()).then_some(block))
	}

	/// Retrieves ERC-20 `Transfer` logs whose recipient topic is the wallet
	async fn get_transfer_logs(
		&self,
		wallet: &Address,
		window: ScannedBlocks,
	) -> Result<Vec<Value>, ProviderError> {
		let filter = json!([{
			"fromBlock": format!("0x{:x}", window.from),
			"toBlock": format!("0x{:x}", window.to),
			"topics": [TRANSFER_TOPIC, null, address_to_topic(wallet)]
		}]);

		match self.call("eth_getLogs", Some(filter)).await? {
			Value::Array(logs) => Ok(logs),
			_ => Err(ProviderError::request_error("Invalid eth_getLogs result")),
		}
	}

	/// Executes a read-only call against a contract
	async fn eth_call(&self, to: &Address, data: &str) -> Result<String, ProviderError> {
		let result = self
			.call(
				"eth_call",
				Some(json!([{"to": checksum_address(to), "data": data}, "latest"])),
			)
			.await?;
		result
			.as_str()
			.map(str::to_string)
			.ok_or_else(|| ProviderError::request_error("Invalid eth_call result"))
	}

	/// Resolves the decimals and symbol of a token contract
	///
	/// Returns `None` when `decimals()` cannot be read; a missing symbol is tolerated.
	async fn get_token_metadata(&self, token: &Address) -> Option<TokenMetadata> {
		let decimals = match self.eth_call(token, DECIMALS_SELECTOR).await {
			Ok(result) => decode_decimals(&result),
			Err(e) => {
				tracing::warn!(token = %token, error = %e, "Failed to read token decimals");
				None
			}
		}?;

		let symbol = match self.eth_call(token, SYMBOL_SELECTOR).await {
			Ok(result) => decode_symbol(&result),
			Err(e) => {
				tracing::debug!(token = %token, error = %e, "Failed to read token symbol");
				None
			}
		};

		Some(TokenMetadata { decimals, symbol })
	}

	/// Converts a block transaction into an inbound transfer, if it is one
	///
	/// Native value sent to the wallet is a native transfer; a zero-value call with
	/// calldata is a contract call. Anything else is ignored.
	fn parse_block_transaction(
		&self,
		raw: &Value,
		wallet: &Address,
		block: u64,
		timestamp: i64,
		head: u64,
	) -> Result<Option<Transaction>, ProviderError> {
		let to = match raw.get("to").and_then(Value::as_str) {
			Some(to) => to,
			// Contract creation
			None => return Ok(None),
		};
		if parse_address(to).as_ref() != Some(wallet) {
			return Ok(None);
		}

		let hash = raw
			.get("hash")
			.and_then(Value::as_str)
			.ok_or_else(|| ProviderError::transaction_error("Transaction without hash"))?;
		let from = raw
			.get("from")
			.and_then(Value::as_str)
			.and_then(parse_address)
			.ok_or_else(|| {
				ProviderError::transaction_error(format!("Invalid sender in transaction {}", hash))
			})?;
		let value = raw
			.get("value")
			.and_then(Value::as_str)
			.map(parse_hex_u256)
			.transpose()
			.map_err(ProviderError::transaction_error)?
			.unwrap_or(U256::ZERO);
		let input = raw
			.get("input")
			.and_then(Value::as_str)
			.unwrap_or("0x");

		let (amount, transaction_type) = if value > U256::ZERO {
			(
				format_units(value, self.network.native_decimals),
				TransactionType::NativeTransfer,
			)
		} else if input.len() > 2 {
			("0".to_string(), TransactionType::ContractCall)
		} else {
			return Ok(None);
		};

		Ok(Some(Transaction {
			hash: hash.to_string(),
			block,
			timestamp,
			confirmations: confirmations(head, block),
			from: checksum_address(&from),
			to: checksum_address(wallet),
			amount,
			token_address: self.network.native_symbol.clone(),
			token_symbol: Some(self.network.native_symbol.clone()),
			token_decimals: Some(self.network.native_decimals),
			transaction_type,
		}))
	}

	/// Walks the blocks of the window, collecting native transfers and contract calls
	///
	/// Returns the collected transfers along with the timestamps of every fetched block.
	async fn scan_blocks(
		&self,
		wallet: &Address,
		window: ScannedBlocks,
		head: u64,
	) -> (Vec<Transaction>, HashMap<u64, i64>) {
		let mut transactions = Vec::new();
		let mut timestamps = HashMap::new();

		for number in window.from..=window.to {
			let block = match self.get_block(number).await {
				Ok(Some(block)) => block,
				Ok(None) => {
					tracing::debug!(block = number, "Block not found, skipping");
					continue;
				}
				Err(e) => {
					tracing::warn!(block = number, error = %e, "Failed to fetch block, skipping");
					continue;
				}
			};

			let timestamp = block
				.get("timestamp")
				.and_then(Value::as_str)
				.and_then(|ts| parse_hex_u64(ts).ok())
				.and_then(|ts| i64::try_from(ts).ok())
				.unwrap_or_else(now_timestamp);
			timestamps.insert(number, timestamp);

			let Some(raw_transactions) = block.get("transactions").and_then(Value::as_array) else {
				continue;
			};
			for raw in raw_transactions {
				match self.parse_block_transaction(raw, wallet, number, timestamp, head) {
					Ok(Some(transaction)) => transactions.push(transaction),
					Ok(None) => {}
					Err(e) => tracing::warn!(block = number, error = %e, "Skipping transaction"),
				}
			}
		}

		(transactions, timestamps)
	}

	/// Converts a `Transfer` log into an inbound token transfer
	async fn parse_transfer_log(
		&self,
		log: &Value,
		wallet: &Address,
		head: u64,
		timestamps: &HashMap<u64, i64>,
		metadata_cache: &mut HashMap<Address, Option<TokenMetadata>>,
	) -> Result<Option<Transaction>, ProviderError> {
		if log.get("removed").and_then(Value::as_bool) == Some(true) {
			return Ok(None);
		}

		let topics: Vec<&str> = log
			.get("topics")
			.and_then(Value::as_array)
			.map(|topics| topics.iter().filter_map(Value::as_str).collect())
			.unwrap_or_default();
		// ERC-721 transfers index the token id as a fourth topic
		if topics.len() != 3 {
			return Ok(None);
		}
		if topic_to_address(topics[2]).as_ref() != Some(wallet) {
			return Ok(None);
		}

		let hash = log
			.get("transactionHash")
			.and_then(Value::as_str)
			.ok_or_else(|| ProviderError::transaction_error("Log without transaction hash"))?;
		let token = log
			.get("address")
			.and_then(Value::as_str)
			.and_then(parse_address)
			.ok_or_else(|| {
				ProviderError::transaction_error(format!("Invalid token address in log of {}", hash))
			})?;
		let block = log
			.get("blockNumber")
			.and_then(Value::as_str)
			.map(parse_hex_u64)
			.transpose()
			.map_err(ProviderError::transaction_error)?
			.ok_or_else(|| {
				ProviderError::transaction_error(format!("Log of {} without block number", hash))
			})?;
		let value = log
			.get("data")
			.and_then(Value::as_str)
			.map(parse_hex_u256)
			.transpose()
			.map_err(ProviderError::transaction_error)?
			.unwrap_or(U256::ZERO);
		let from = topic_to_address(topics[1])
			.map(|from| checksum_address(&from))
			.ok_or_else(|| {
				ProviderError::transaction_error(format!("Invalid sender topic in log of {}", hash))
			})?;

		if !metadata_cache.contains_key(&token) {
			let metadata = self.get_token_metadata(&token).await;
			metadata_cache.insert(token, metadata);
		}
		let metadata = metadata_cache
			.get(&token)
			.cloned()
			.flatten()
			.ok_or_else(|| {
				ProviderError::transaction_error(format!(
					"Unknown decimals for token {}",
					checksum_address(&token)
				))
			})?;

		Ok(Some(Transaction {
			hash: hash.to_string(),
			block,
			timestamp: timestamps.get(&block).copied().unwrap_or_else(now_timestamp),
			confirmations: confirmations(head, block),
			from,
			to: checksum_address(wallet),
			amount: format_units(value, metadata.decimals),
			token_address: checksum_address(&token),
			token_symbol: metadata.symbol,
			token_decimals: Some(metadata.decimals),
			transaction_type: TransactionType::TokenTransfer,
		}))
	}

	/// Scans the window for native and ERC-20 transfers into the wallet
	async fn scan(
		&self,
		wallet: Address,
		from_block: Option<u64>,
	) -> Result<WalletScan, ProviderError> {
		let head = self.get_block_number().await?;
		let window = resolve_block_window(
			head,
			from_block,
			self.network.lookback,
			self.network.max_scan_blocks,
		);
		if window.from > window.to {
			return Ok(WalletScan {
				transactions: Vec::new(),
				scanned_blocks: window,
			});
		}

		// Token transfers are one candidate source among others, a listing failure only
		// loses that source
		let logs = self
			.get_transfer_logs(&wallet, window)
			.await
			.unwrap_or_else(|e| {
				tracing::warn!(error = %e, "Skipping ERC-20 transfers, log listing failed");
				Vec::new()
			});
		let (mut transactions, timestamps) = self.scan_blocks(&wallet, window, head).await;

		let mut metadata_cache = HashMap::new();
		for log in &logs {
			match self
				.parse_transfer_log(log, &wallet, head, &timestamps, &mut metadata_cache)
				.await
			{
				Ok(Some(transaction)) => transactions.push(transaction),
				Ok(None) => {}
				Err(e) => tracing::warn!(error = %e, "Skipping transfer log"),
			}
		}

		Ok(WalletScan {
			transactions,
			scanned_blocks: window,
		})
	}
}

/// Confirmation depth of a block, counting the block itself
fn confirmations(head: u64, block: u64) -> u64 {
	head.saturating_sub(block) + 1
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> ChainProvider for EvmProvider<T> {
	fn is_valid_address(&self, address: &str) -> bool {
		is_valid_evm_address(address)
	}

	fn normalize_address(&self, address: &str) -> String {
		if !is_valid_evm_address(address) {
			return address.to_string();
		}
		parse_address(address)
			.map(|parsed| checksum_address(&parsed))
			.unwrap_or_else(|| address.to_string())
	}

	async fn test_connection(&self) -> bool {
		match self.get_block_number().await {
			Ok(_) => true,
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
		let Some(wallet) = is_valid_evm_address(address)
			.then(|| parse_address(address))
			.flatten()
		else {
			return WalletMonitorResult::error(
				address,
				format!("Invalid {} address", self.network.name),
				None,
			);
		};

		run_scan(
			&checksum_address(&wallet),
			self.scan_timeout,
			self.scan(wallet, from_block),
		)
		.await
	}
}
