use std::{
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	},
	time::Duration,
};

use serde_json::{json, Value};

use crate::integration::mocks::{create_starknet_test_network, rpc_response, MockJsonRpcTransport};
use wallet_monitor::{
	models::{ScannedBlocks, TransactionType, WalletMonitorStatus},
	services::blockchain::{
		starknet_helpers::{TRACKED_TOKENS, TRANSFER_SELECTOR},
		ChainProvider, StarknetProvider, TransportError, SCAN_FAILED_ERROR,
	},
};

const WALLET: &str = "0x04a3b5c2d1e0f9a8b7c6d5e4f3a2b1c0d9e8f7a6b5c4d3e2f1a0b9c8d7e6f5a4";
const SENDER: &str = "0x0000000000000000000000000000000000000000000000000000000000001234";
const OTHER: &str = "0x0000000000000000000000000000000000000000000000000000000000005678";

fn provider(transport: MockJsonRpcTransport) -> StarknetProvider<MockJsonRpcTransport> {
	StarknetProvider::new_with_transport(
		transport,
		&create_starknet_test_network(),
		Duration::from_secs(5),
	)
}

fn filter_of(params: &Option<Value>) -> Value {
	params
		.as_ref()
		.map(|p| p["filter"].clone())
		.unwrap_or(Value::Null)
}

#[tokio::test]
async fn test_scan_pages_through_transfer_events() {
	let timestamp_calls = Arc::new(AtomicUsize::new(0));
	let counter = timestamp_calls.clone();
	let eth = TRACKED_TOKENS[0].address;

	let mut transport = MockJsonRpcTransport::new();
	transport
		.expect_send_raw_request()
		.returning(move |method, params| {
			let result = match method {
				"starknet_blockNumber" => json!(1000),
				"starknet_getEvents" => {
					let filter = filter_of(&params);
					assert_eq!(filter["keys"], json!([[TRANSFER_SELECTOR], [], [WALLET]]));
					assert_eq!(filter["from_block"]["block_number"], 901);
					assert_eq!(filter["to_block"]["block_number"], 1000);

					if filter["address"] != eth {
						json!({"events": []})
					} else if filter.get("continuation_token").is_none() {
						json!({
							"events": [
								{
									"from_address": eth,
									"keys": [TRANSFER_SELECTOR, SENDER, WALLET],
									"data": ["0x14d1120d7b160000", "0x0"],
									"block_number": 950,
									"transaction_hash": "0xaaa"
								},
								{
									"from_address": eth,
									"keys": [TRANSFER_SELECTOR, SENDER, OTHER],
									"data": ["0x1", "0x0"],
									"block_number": 951,
									"transaction_hash": "0xbbb"
								}
							],
							"continuation_token": "page-2"
						})
					} else {
						assert_eq!(filter["continuation_token"], "page-2");
						json!({
							"events": [
								{
									"from_address": eth,
									"keys": [TRANSFER_SELECTOR, SENDER, "0x4a3b5c2d1e0f9a8b7c6d5e4f3a2b1c0d9e8f7a6b5c4d3e2f1a0b9c8d7e6f5a4"],
									"data": ["0xde0b6b3a7640000", "0x0"],
									"block_number": 990,
									"transaction_hash": "0xccc"
								},
								{
									"from_address": eth,
									"keys": [TRANSFER_SELECTOR, SENDER, WALLET],
									"data": ["0x2", "0x0"],
									"block_number": 950,
									"transaction_hash": "0xddd"
								}
							]
						})
					}
				}
				"starknet_getBlockWithTxHashes" => {
					counter.fetch_add(1, Ordering::SeqCst);
					let number = params.as_ref().unwrap()["block_id"]["block_number"]
						.as_u64()
						.unwrap();
					json!({"block_number": number, "timestamp": 1_700_000_000u64 + number})
				}
				_ => return Err(TransportError::http(400, "http://localhost", "unexpected")),
			};
			Ok(rpc_response(result))
		});

	let result = provider(transport)
		.monitor_wallet_transactions(WALLET, None)
		.await;

	assert_eq!(result.status, WalletMonitorStatus::Success);
	assert_eq!(result.scanned_blocks, ScannedBlocks::new(901, 1000));
	assert_eq!(result.total_transactions, 3);
	// Blocks 950 and 990, block 950 fetched once
	assert_eq!(timestamp_calls.load(Ordering::SeqCst), 2);

	let hashes: Vec<&str> = result.transactions.iter().map(|tx| tx.hash.as_str()).collect();
	assert_eq!(hashes, vec!["0xccc", "0xaaa", "0xddd"]);

	let newest = &result.transactions[0];
	assert_eq!(newest.amount, "1");
	assert_eq!(newest.timestamp, 1_700_000_990);
	assert_eq!(newest.confirmations, 11);
	assert_eq!(newest.to, WALLET);

	let first = &result.transactions[1];
	assert_eq!(first.amount, "1.5");
	assert_eq!(first.from, SENDER);
	assert_eq!(first.token_symbol.as_deref(), Some("ETH"));
	assert_eq!(first.transaction_type, TransactionType::TokenTransfer);
}

#[tokio::test]
async fn test_short_address_is_normalized() {
	let mut transport = MockJsonRpcTransport::new();
	transport
		.expect_send_raw_request()
		.returning(|method, _| match method {
			"starknet_blockNumber" => Ok(rpc_response(json!(5))),
			_ => Ok(rpc_response(json!({"events": []}))),
		});

	let result = provider(transport)
		.monitor_wallet_transactions("0x4A3B5C2D1E0F9A8B7C6D5E4F3A2B1C0D9E8F7A6B5C4D3E2F1A0B9C8D7E6F5A4", None)
		.await;

	assert!(result.is_success());
	assert_eq!(result.wallet_address, WALLET);
	assert_eq!(result.scanned_blocks, ScannedBlocks::new(0, 5));
}

#[tokio::test]
async fn test_head_lookup_failure_is_an_error_result() {
	let mut transport = MockJsonRpcTransport::new();
	transport
		.expect_send_raw_request()
		.times(1)
		.returning(|_, _| Err(TransportError::network("connection refused", None)));

	let result = provider(transport)
		.monitor_wallet_transactions(WALLET, None)
		.await;

	assert_eq!(result.status, WalletMonitorStatus::Error);
	assert_eq!(result.error.as_deref(), Some(SCAN_FAILED_ERROR));
	assert!(result.transactions.is_empty());
}

#[tokio::test]
async fn test_failed_token_listing_keeps_other_tokens() {
	let eth = TRACKED_TOKENS[0].address;

	let mut transport = MockJsonRpcTransport::new();
	transport
		.expect_send_raw_request()
		.returning(move |method, params| match method {
			"starknet_blockNumber" => Ok(rpc_response(json!(1000))),
			"starknet_getEvents" if filter_of(&params)["address"] == eth => {
				Ok(rpc_response(json!({
					"events": [{
						"from_address": eth,
						"keys": [TRANSFER_SELECTOR, SENDER, WALLET],
						"data": ["0xde0b6b3a7640000", "0x0"],
						"block_number": 995,
						"transaction_hash": "0xeee"
					}]
				})))
			}
			"starknet_getEvents" => Err(TransportError::http(502, "http://localhost", "bad gateway")),
			_ => Ok(rpc_response(json!({"timestamp": 1_700_000_000}))),
		});

	let result = provider(transport)
		.monitor_wallet_transactions(WALLET, Some(990))
		.await;

	assert_eq!(result.status, WalletMonitorStatus::Success);
	assert_eq!(result.scanned_blocks, ScannedBlocks::new(990, 1000));
	assert_eq!(result.total_transactions, 1);
	assert_eq!(result.transactions[0].hash, "0xeee");
	assert_eq!(result.transactions[0].token_symbol.as_deref(), Some("ETH"));
}

#[tokio::test]
async fn test_truncated_listing_reports_covered_range() {
	let eth = TRACKED_TOKENS[0].address;
	let pages = Arc::new(AtomicUsize::new(0));
	let counter = pages.clone();

	// Every page holds one receipt and points to a further page
	let mut transport = MockJsonRpcTransport::new();
	transport
		.expect_send_raw_request()
		.returning(move |method, params| {
			let result = match method {
				"starknet_blockNumber" => json!(1000),
				"starknet_getEvents" if filter_of(&params)["address"] == eth => {
					let page = counter.fetch_add(1, Ordering::SeqCst) as u64;
					json!({
						"events": [{
							"from_address": eth,
							"keys": [TRANSFER_SELECTOR, SENDER, WALLET],
							"data": ["0x1", "0x0"],
							"block_number": 901 + page,
							"transaction_hash": format!("0x{:x}", page + 1)
						}],
						"continuation_token": format!("page-{}", page + 2)
					})
				}
				"starknet_getEvents" => json!({"events": []}),
				_ => json!({"timestamp": 1_700_000_000}),
			};
			Ok(rpc_response(result))
		});

	let result = provider(transport)
		.monitor_wallet_transactions(WALLET, None)
		.await;

	// Twenty pages reach block 920, which may hold further unlisted events
	assert_eq!(pages.load(Ordering::SeqCst), 20);
	assert!(result.is_success());
	assert_eq!(result.scanned_blocks, ScannedBlocks::new(901, 919));
	assert_eq!(result.total_transactions, 19);
	assert_eq!(result.transactions[0].block, 919);
	assert!(result
		.transactions
		.iter()
		.all(|tx| (901..=919).contains(&tx.block)));
}

#[tokio::test]
async fn test_address_validation() {
	let mut transport = MockJsonRpcTransport::new();
	transport.expect_send_raw_request().never();
	let provider = provider(transport);

	assert!(provider.is_valid_address(WALLET));
	assert!(provider.is_valid_address("0x1"));
	assert!(!provider.is_valid_address(
		"0x0800000000000000000000000000000000000000000000000000000000000000"
	));
	assert!(!provider.is_valid_address("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"));
}
