//! Starknet provider implementation.
//!
//! Starknet has no native value transfer: ETH and STRK are ERC-20 fee tokens. The
//! provider pages through the `Transfer` events of each tracked token over the scan
//! window, asking the node for the events keyed on the monitored wallet as recipient.
//! Both fee tokens emit the Cairo 1 layout, where sender and recipient are keys.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::{collections::HashMap, time::Duration};
use tracing::instrument;

use crate::{
	models::{Network, ScannedBlocks, Transaction, TransactionType, WalletMonitorResult},
	services::blockchain::{
		provider::{now_timestamp, resolve_block_window, run_scan, ChainProvider, WalletScan},
		providers::{
			rpc_result,
			starknet_helpers::{
				block_number_of, decode_transfer_event, is_valid_starknet_address,
				normalize_starknet_address, TrackedToken, TRACKED_TOKENS, TRANSFER_SELECTOR,
			},
		},
		transports::{BlockchainTransport, HttpTransportClient},
		ProviderError,
	},
	utils::parsing::format_units,
};

const TEST_CONNECTION_PAYLOAD: &str =
	r#"{"id":1,"jsonrpc":"2.0","method":"starknet_blockNumber","params":[]}"#;

/// Events requested per `starknet_getEvents` page
const EVENTS_CHUNK_SIZE: u64 = 100;

/// Upper bound on the pages fetched per token and scan
const MAX_EVENT_PAGES: usize = 20;

/// `Transfer` events of one token and the last block they fully cover
struct EventListing {
	events: Vec<Value>,
	covered_to: u64,
}

/// Provider implementation for Starknet
#[derive(Clone)]
pub struct StarknetProvider<T: Send + Sync + Clone> {
	/// The underlying transport client for RPC communication
	transport: T,
	/// Network configuration (scan window)
	network: Network,
	/// Wall-clock bound of a single scan
	scan_timeout: Duration,
}

impl<T: Send + Sync + Clone> StarknetProvider<T> {
	/// Creates a new Starknet provider instance with a specific transport client
	pub fn new_with_transport(transport: T, network: &Network, scan_timeout: Duration) -> Self {
		Self {
			transport,
			network: network.clone(),
			scan_timeout,
		}
	}
}

impl StarknetProvider<HttpTransportClient> {
	/// Creates a new Starknet provider talking JSON-RPC over HTTP
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

impl<T: Send + Sync + Clone + BlockchainTransport> StarknetProvider<T> {
	async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, ProviderError> {
		let response = self.transport.send_raw_request(method, params).await?;
		rpc_result(method, response)
	}

	/// Retrieves the latest block number
	async fn get_block_number(&self) -> Result<u64, ProviderError> {
		let result = self.call("starknet_blockNumber", None).await?;
		block_number_of(&result)
			.ok_or_else(|| ProviderError::request_error("Invalid starknet_blockNumber result"))
	}

	/// Retrieves the timestamp of a block
	async fn get_block_timestamp(&self, number: u64) -> Result<i64, ProviderError> {
		let block = self
			.call(
				"starknet_getBlockWithTxHashes",
				Some(json!({"block_id": {"block_number": number}})),
			)
			.await?;
		block
			.get("timestamp")
			.and_then(Value::as_i64)
			.ok_or_else(|| {
				ProviderError::request_error(format!("Block {} has no timestamp", number))
			})
	}

	/// Lists the `Transfer` events of a token received by the wallet, following
	/// continuation tokens up to [`MAX_EVENT_PAGES`] pages
	///
	/// The recipient is matched on the event keys by the node. Pages come oldest
	/// first, so a listing cut short by the page cap only covers the blocks before the
	/// last one seen; events of that partially listed block are dropped.
	async fn get_transfer_events(
		&self,
		token: &TrackedToken,
		wallet: &str,
		window: ScannedBlocks,
	) -> Result<EventListing, ProviderError> {
		let mut events = Vec::new();
		let mut continuation_token: Option<String> = None;

		for _ in 0..MAX_EVENT_PAGES {
			let mut filter = json!({
				"from_block": {"block_number": window.from},
				"to_block": {"block_number": window.to},
				"address": token.address,
				"keys": [[TRANSFER_SELECTOR], [], [wallet]],
				"chunk_size": EVENTS_CHUNK_SIZE,
			});
			if let Some(continuation) = &continuation_token {
				filter["continuation_token"] = json!(continuation);
			}

			let page = self
				.call("starknet_getEvents", Some(json!({"filter": filter})))
				.await?;
			let page_events = page
				.get("events")
				.and_then(Value::as_array)
				.ok_or_else(|| ProviderError::request_error("Invalid starknet_getEvents result"))?;
			events.extend(page_events.iter().cloned());

			continuation_token = page
				.get("continuation_token")
				.and_then(Value::as_str)
				.map(str::to_string);
			if continuation_token.is_none() {
				return Ok(EventListing {
					events,
					covered_to: window.to,
				});
			}
		}

		let last_block = events
			.iter()
			.rev()
			.find_map(|event| event.get("block_number").and_then(block_number_of));
		let covered_to = last_block.map_or(window.to, |block| {
			block.saturating_sub(1).min(window.to)
		});
		events.retain(|event| {
			event
				.get("block_number")
				.and_then(block_number_of)
				.is_some_and(|block| block <= covered_to)
		});

		tracing::warn!(
			token = token.symbol,
			pages = MAX_EVENT_PAGES,
			covered_to,
			"Transfer event listing truncated"
		);
		Ok(EventListing { events, covered_to })
	}

	/// Converts a `Transfer` event into an inbound transfer, if it is one
	async fn parse_transfer_event(
		&self,
		event: &Value,
		token: &TrackedToken,
		wallet: &str,
		head: u64,
		timestamps: &mut HashMap<u64, i64>,
	) -> Result<Option<Transaction>, ProviderError> {
		let transfer = decode_transfer_event(event)
			.ok_or_else(|| ProviderError::transaction_error("Malformed Transfer event"))?;
		if transfer.to != wallet {
			return Ok(None);
		}

		let hash = event
			.get("transaction_hash")
			.and_then(Value::as_str)
			.ok_or_else(|| ProviderError::transaction_error("Event without transaction hash"))?;
		// Pending events carry no block number
		let Some(block) = event.get("block_number").and_then(block_number_of) else {
			return Ok(None);
		};

		let timestamp = match timestamps.get(&block) {
			Some(timestamp) => *timestamp,
			None => {
				let timestamp = self.get_block_timestamp(block).await.unwrap_or_else(|e| {
					tracing::debug!(block, error = %e, "Falling back to current time");
					now_timestamp()
				});
				timestamps.insert(block, timestamp);
				timestamp
			}
		};

		Ok(Some(Transaction {
			hash: hash.to_string(),
			block,
			timestamp,
			confirmations: head.saturating_sub(block) + 1,
			from: transfer.from,
			to: wallet.to_string(),
			amount: format_units(transfer.amount, token.decimals),
			token_address: token.address.to_string(),
			token_symbol: Some(token.symbol.to_string()),
			token_decimals: Some(token.decimals),
			transaction_type: TransactionType::TokenTransfer,
		}))
	}

	async fn scan(&self, wallet: &str, from_block: Option<u64>) -> Result<WalletScan, ProviderError> {
		let head = self.get_block_number().await?;
		let window = resolve_block_window(
			head,
			from_block,
			self.network.lookback,
			self.network.max_scan_blocks,
		);
		let mut transactions = Vec::new();
		if window.from > window.to {
			return Ok(WalletScan {
				transactions,
				scanned_blocks: window,
			});
		}

		let mut timestamps = HashMap::new();
		let mut scanned_to = window.to;
		for token in &TRACKED_TOKENS {
			let listing = match self.get_transfer_events(token, wallet, window).await {
				Ok(listing) => listing,
				Err(e) => {
					tracing::warn!(token = token.symbol, error = %e, "Skipping token, event listing failed");
					continue;
				}
			};
			scanned_to = scanned_to.min(listing.covered_to);

			for event in &listing.events {
				match self
					.parse_transfer_event(event, token, wallet, head, &mut timestamps)
					.await
				{
					Ok(Some(transaction)) => transactions.push(transaction),
					Ok(None) => {}
					Err(e) => tracing::warn!(token = token.symbol, error = %e, "Skipping event"),
				}
			}
		}
		// Every token must have been listed over the reported range
		transactions.retain(|transaction| transaction.block <= scanned_to);

		Ok(WalletScan {
			transactions,
			scanned_blocks: ScannedBlocks::new(window.from, scanned_to),
		})
	}
}

#[async_trait]
impl<T: Send + Sync + Clone + BlockchainTransport> ChainProvider for StarknetProvider<T> {
	fn is_valid_address(&self, address: &str) -> bool {
		is_valid_starknet_address(address)
	}

	fn normalize_address(&self, address: &str) -> String {
		normalize_starknet_address(address)
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
		if !is_valid_starknet_address(address) {
			return WalletMonitorResult::error(
				address,
				format!("Invalid {} address", self.network.name),
				None,
			);
		}

		let wallet = normalize_starknet_address(address);
		run_scan(&wallet, self.scan_timeout, self.scan(&wallet, from_block)).await
	}
}
