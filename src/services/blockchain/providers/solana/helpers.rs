//! Helper functions for Solana-specific operations.
//!
//! Address handling plus extraction of inbound transfers from the balance changes
//! recorded in a `jsonParsed` transaction.

use alloy::primitives::U256;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{
	models::{Transaction, TransactionType, UNKNOWN_SENDER},
	services::blockchain::ProviderError,
	utils::parsing::format_units,
};

/// Length of an ed25519 public key
const PUBKEY_LENGTH: usize = 32;

/// Native asset of a Solana network
#[derive(Debug, Clone)]
pub struct NativeAsset {
	pub symbol: String,
	pub decimals: u8,
}

/// Checks whether a string is a base58 encoded 32 byte public key
pub fn is_valid_solana_address(address: &str) -> bool {
	decode_pubkey(address).is_some()
}

/// Canonical base58 form of a public key, or the input unchanged
pub fn normalize_solana_address(address: &str) -> String {
	decode_pubkey(address)
		.map(|bytes| bs58::encode(bytes).into_string())
		.unwrap_or_else(|| address.to_string())
}

fn decode_pubkey(address: &str) -> Option<Vec<u8>> {
	bs58::decode(address)
		.into_vec()
		.ok()
		.filter(|bytes| bytes.len() == PUBKEY_LENGTH)
}

/// Account keys of a transaction message, in index order
///
/// `jsonParsed` encodes keys as objects carrying a `pubkey`, plain `json` encodes
/// them as strings; both are accepted.
fn account_keys(transaction: &Value) -> Vec<&str> {
	transaction
		.pointer("/transaction/message/accountKeys")
		.and_then(Value::as_array)
		.map(|keys| {
			keys.iter()
				.filter_map(|key| {
					key.as_str()
						.or_else(|| key.get("pubkey").and_then(Value::as_str))
				})
				.collect()
		})
		.unwrap_or_default()
}

fn balance_at(meta: &Value, field: &str, index: usize) -> Option<u64> {
	meta.get(field)?.as_array()?.get(index)?.as_u64()
}

/// Sums the token balances owned by `owner`, keyed by mint
///
/// Values are `(raw amount, decimals)`.
fn token_balances_by_mint(
	meta: &Value,
	field: &str,
	owner: &str,
) -> Result<BTreeMap<String, (u128, u8)>, ProviderError> {
	let mut balances = BTreeMap::new();
	let Some(entries) = meta.get(field).and_then(Value::as_array) else {
		return Ok(balances);
	};

	for entry in entries {
		if entry.get("owner").and_then(Value::as_str) != Some(owner) {
			continue;
		}
		let mint = entry
			.get("mint")
			.and_then(Value::as_str)
			.ok_or_else(|| ProviderError::transaction_error("Token balance without mint"))?;
		let amount = entry
			.pointer("/uiTokenAmount/amount")
			.and_then(Value::as_str)
			.and_then(|amount| amount.parse::<u128>().ok())
			.ok_or_else(|| {
				ProviderError::transaction_error(format!("Invalid token amount for mint {}", mint))
			})?;
		let decimals = entry
			.pointer("/uiTokenAmount/decimals")
			.and_then(Value::as_u64)
			.and_then(|decimals| u8::try_from(decimals).ok())
			.unwrap_or_default();

		let balance = balances.entry(mint.to_string()).or_insert((0u128, decimals));
		balance.0 = balance.0.saturating_add(amount);
	}

	Ok(balances)
}

/// Extracts the inbound transfers of `wallet` from a fetched transaction
///
/// A native transfer is reported when the wallet's lamport balance grew; a token
/// transfer for every mint whose balance owned by the wallet grew. The sender is not
/// attributed.
///
/// # Arguments
/// * `transaction` - The `getTransaction` result
/// * `wallet` - Canonical wallet address
/// * `signature` - Transaction signature
/// * `slot` - Slot the transaction landed in
/// * `timestamp` - Block time, already defaulted by the caller
/// * `confirmations` - Confirmation depth of the slot
/// * `native` - Native asset of the network
pub fn extract_inbound_transfers(
	transaction: &Value,
	wallet: &str,
	signature: &str,
	slot: u64,
	timestamp: i64,
	confirmations: u64,
	native: &NativeAsset,
) -> Result<Vec<Transaction>, ProviderError> {
	let meta = transaction
		.get("meta")
		.filter(|meta| !meta.is_null())
		.ok_or_else(|| {
			ProviderError::transaction_error(format!("Transaction {} has no metadata", signature))
		})?;

	let record = |amount: String,
	              token_address: String,
	              token_symbol: Option<String>,
	              token_decimals: u8,
	              transaction_type: TransactionType| Transaction {
		hash: signature.to_string(),
		block: slot,
		timestamp,
		confirmations,
		from: UNKNOWN_SENDER.to_string(),
		to: wallet.to_string(),
		amount,
		token_address,
		token_symbol,
		token_decimals: Some(token_decimals),
		transaction_type,
	};

	let mut transfers = Vec::new();

	if let Some(index) = account_keys(transaction).iter().position(|key| *key == wallet) {
		let pre = balance_at(meta, "preBalances", index);
		let post = balance_at(meta, "postBalances", index);
		if let (Some(pre), Some(post)) = (pre, post) {
			if post > pre {
				transfers.push(record(
					format_units(U256::from(post - pre), native.decimals),
					native.symbol.clone(),
					Some(native.symbol.clone()),
					native.decimals,
					TransactionType::NativeTransfer,
				));
			}
		}
	}

	let pre_tokens = token_balances_by_mint(meta, "preTokenBalances", wallet)?;
	let post_tokens = token_balances_by_mint(meta, "postTokenBalances", wallet)?;
	for (mint, (post_amount, decimals)) in post_tokens {
		let pre_amount = pre_tokens.get(&mint).map(|(amount, _)| *amount).unwrap_or(0);
		if post_amount > pre_amount {
			transfers.push(record(
				format_units(U256::from(post_amount - pre_amount), decimals),
				mint,
				None,
				decimals,
				TransactionType::TokenTransfer,
			));
		}
	}

	Ok(transfers)
}
