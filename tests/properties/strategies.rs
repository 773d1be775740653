use alloy::primitives::Address;
use proptest::prelude::*;

use wallet_monitor::models::{Transaction, TransactionType};

const MAX_TRANSACTIONS: usize = 30;

pub fn transaction_type_strategy() -> impl Strategy<Value = TransactionType> {
	prop_oneof![
		Just(TransactionType::NativeTransfer),
		Just(TransactionType::TokenTransfer),
		Just(TransactionType::ContractCall),
	]
}

// Blocks are drawn from a small range so that ties are common
pub fn transaction_strategy() -> impl Strategy<Value = Transaction> {
	(
		"0x[0-9a-f]{8}",
		0u64..20,
		any::<u32>(),
		transaction_type_strategy(),
		"[0-9]{1,6}(\\.[0-9]{1,6})?",
	)
		.prop_map(|(hash, block, timestamp, transaction_type, amount)| Transaction {
			hash,
			block,
			timestamp: i64::from(timestamp),
			confirmations: 20 - block,
			from: "sender".to_string(),
			to: "wallet".to_string(),
			amount,
			token_address: "ETH".to_string(),
			token_symbol: Some("ETH".to_string()),
			token_decimals: Some(18),
			transaction_type,
		})
}

pub fn transactions_strategy() -> impl Strategy<Value = Vec<Transaction>> {
	prop::collection::vec(transaction_strategy(), 0..MAX_TRANSACTIONS)
}

pub fn evm_address_strategy() -> impl Strategy<Value = String> {
	prop_oneof![
		any::<[u8; 20]>().prop_map(|bytes| Address::from(bytes).to_checksum(None)),
		any::<[u8; 20]>().prop_map(|bytes| format!("0x{}", hex::encode(bytes))),
		any::<[u8; 20]>().prop_map(|bytes| format!("0x{}", hex::encode_upper(bytes))),
		"0x[0-9a-fA-F]{0,42}",
		".*",
	]
}

pub fn solana_address_strategy() -> impl Strategy<Value = String> {
	prop_oneof![
		any::<[u8; 32]>().prop_map(|bytes| bs58::encode(bytes).into_string()),
		"[1-9A-HJ-NP-Za-km-z]{30,46}",
		".*",
	]
}

pub fn starknet_address_strategy() -> impl Strategy<Value = String> {
	prop_oneof![
		"0x0[0-7][0-9a-fA-F]{0,62}",
		"0x[0-9a-f]{1,10}",
		"0x[0-9a-fA-F]{63,66}",
		".*",
	]
}
