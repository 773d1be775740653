use std::time::Duration;

use mockall::predicate;
use serde_json::{json, Value};

use crate::integration::mocks::{create_solana_test_network, rpc_response, MockJsonRpcTransport};
use wallet_monitor::{
	models::{ScannedBlocks, TransactionType, WalletMonitorStatus, UNKNOWN_SENDER},
	services::blockchain::{ChainProvider, SolanaProvider, TransportError, SCAN_FAILED_ERROR},
};

const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
const SENDER: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";

fn provider(transport: MockJsonRpcTransport) -> SolanaProvider<MockJsonRpcTransport> {
	SolanaProvider::new_with_transport(
		transport,
		&create_solana_test_network(),
		Duration::from_secs(5),
	)
}

fn signatures() -> Value {
	json!([
		{"signature": "sig-5", "slot": 995, "err": null, "blockTime": 1_700_000_005},
		{"signature": "sig-4", "slot": 994, "err": null, "blockTime": 1_700_000_004},
		{"signature": "sig-failed", "slot": 994, "err": {"InstructionError": [0, "Custom"]}, "blockTime": 1_700_000_004},
		{"signature": "sig-3", "slot": 993, "err": null, "blockTime": 1_700_000_003},
		{"signature": "sig-2", "slot": 992, "err": null, "blockTime": 1_700_000_002},
		{"signature": "sig-1", "slot": 991, "err": null, "blockTime": null}
	])
}

fn lamport_receipt(slot: u64, lamports: u64) -> Value {
	json!({
		"slot": slot,
		"blockTime": 1_700_000_000,
		"transaction": {"message": {"accountKeys": [
			{"pubkey": SENDER, "signer": true, "writable": true},
			{"pubkey": WALLET, "signer": false, "writable": true}
		]}},
		"meta": {
			"err": null,
			"preBalances": [10_000_000_000u64, 0u64],
			"postBalances": [10_000_000_000u64 - lamports - 5000, lamports],
			"preTokenBalances": [],
			"postTokenBalances": []
		}
	})
}

fn signature_param(params: &Option<Value>) -> String {
	params
		.as_ref()
		.and_then(|p| p[0].as_str())
		.unwrap_or_default()
		.to_string()
}

#[tokio::test]
async fn test_one_failing_candidate_is_skipped() {
	let mut transport = MockJsonRpcTransport::new();
	transport
		.expect_send_raw_request()
		.returning(|method, params| match method {
			"getSlot" => Ok(rpc_response(json!(1000))),
			"getSignaturesForAddress" => {
				assert_eq!(params.as_ref().unwrap()[1]["limit"], 50);
				Ok(rpc_response(signatures()))
			}
			"getTransaction" => match signature_param(&params).as_str() {
				"sig-failed" => panic!("failed transactions are never fetched"),
				"sig-2" => Err(TransportError::http(500, "http://localhost", "boom")),
				sig => {
					let slot = 990 + sig[4..].parse::<u64>().unwrap();
					Ok(rpc_response(lamport_receipt(slot, 1_500_000_000)))
				}
			},
			_ => Err(TransportError::http(400, "http://localhost", "unexpected")),
		});

	let result = provider(transport)
		.monitor_wallet_transactions(WALLET, None)
		.await;

	assert_eq!(result.status, WalletMonitorStatus::Success);
	assert_eq!(result.total_transactions, 4);
	assert_eq!(result.scanned_blocks, ScannedBlocks::new(0, 0));

	let blocks: Vec<u64> = result.transactions.iter().map(|tx| tx.block).collect();
	assert_eq!(blocks, vec![995, 994, 993, 991]);

	for tx in &result.transactions {
		assert_eq!(tx.to, WALLET);
		assert_eq!(tx.from, UNKNOWN_SENDER);
		assert_eq!(tx.amount, "1.5");
		assert_eq!(tx.token_address, "SOL");
		assert_eq!(tx.transaction_type, TransactionType::NativeTransfer);
		assert_eq!(tx.confirmations, 1000 - tx.block);
	}
}

#[tokio::test]
async fn test_from_slot_drops_older_signatures() {
	let mut transport = MockJsonRpcTransport::new();
	transport
		.expect_send_raw_request()
		.returning(|method, params| match method {
			"getSlot" => Ok(rpc_response(json!(1000))),
			"getSignaturesForAddress" => Ok(rpc_response(signatures())),
			"getTransaction" => {
				let sig = signature_param(&params);
				assert!(sig == "sig-5" || sig == "sig-4", "unexpected fetch of {}", sig);
				Ok(rpc_response(lamport_receipt(995, 1_000_000_000)))
			}
			_ => Err(TransportError::http(400, "http://localhost", "unexpected")),
		});

	let result = provider(transport)
		.monitor_wallet_transactions(WALLET, Some(994))
		.await;

	assert!(result.is_success());
	assert_eq!(result.total_transactions, 2);
}

#[tokio::test]
async fn test_signature_listing_failure_is_an_error_result() {
	let mut transport = MockJsonRpcTransport::new();
	transport
		.expect_send_raw_request()
		.returning(|method, _| match method {
			"getSlot" => Ok(rpc_response(json!(1000))),
			_ => Ok(json!({
				"jsonrpc": "2.0",
				"id": 1,
				"error": {"code": -32602, "message": "Invalid param: WrongSize"}
			})),
		});

	let result = provider(transport)
		.monitor_wallet_transactions(WALLET, None)
		.await;

	assert_eq!(result.status, WalletMonitorStatus::Error);
	assert_eq!(result.error.as_deref(), Some(SCAN_FAILED_ERROR));
	assert!(result.details.unwrap().contains("WrongSize"));
}

#[tokio::test]
async fn test_invalid_address_is_rejected_without_network_call() {
	let mut transport = MockJsonRpcTransport::new();
	transport.expect_send_raw_request().never();

	let provider = provider(transport);
	assert!(!provider.is_valid_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));

	let result = provider.monitor_wallet_transactions("short", None).await;
	assert_eq!(result.status, WalletMonitorStatus::Error);
}

#[tokio::test]
async fn test_connection_uses_epoch_info() {
	let mut transport = MockJsonRpcTransport::new();
	transport
		.expect_send_raw_request()
		.with(predicate::eq("getEpochInfo"), predicate::always())
		.times(1)
		.returning(|_, _| {
			Ok(rpc_response(json!({
				"absoluteSlot": 1000,
				"epoch": 600,
				"slotIndex": 40,
				"slotsInEpoch": 432000
			})))
		});

	assert!(provider(transport).test_connection().await);
}
