//! Helper functions for Starknet-specific operations.
//!
//! Starknet addresses are field elements below 2^251. ERC-20 `Transfer` events come
//! in two layouts depending on the Cairo version of the token contract:
//! - Cairo 0: `keys = [selector]`, `data = [from, to, amount_low, amount_high]`
//! - Cairo 1: `keys = [selector, from, to]`, `data = [amount_low, amount_high]`

use alloy::primitives::U256;
use serde_json::Value;

use crate::utils::parsing::{parse_hex_u256, parse_hex_u64};

/// sn_keccak("Transfer")
pub const TRANSFER_SELECTOR: &str =
	"0x0099cd8bde557814842a3121e8ddfd433a539b8c9f14bf31ebf108d12e6196e9";

/// A fungible token whose transfers are tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedToken {
	pub address: &'static str,
	pub symbol: &'static str,
	pub decimals: u8,
}

/// Tokens scanned for inbound transfers: the ETH and STRK fee tokens
pub const TRACKED_TOKENS: [TrackedToken; 2] = [
	TrackedToken {
		address: "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7",
		symbol: "ETH",
		decimals: 18,
	},
	TrackedToken {
		address: "0x04718f5a0fc34cc1af16a1cdee98ffb20c31f5cd61d6ab07201858f4287c938d",
		symbol: "STRK",
		decimals: 18,
	},
];

/// A decoded `Transfer` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
	/// Normalized sender
	pub from: String,
	/// Normalized recipient
	pub to: String,
	/// Raw amount in base units
	pub amount: U256,
}

fn felt_digits(address: &str) -> Option<&str> {
	let digits = address
		.strip_prefix("0x")
		.or_else(|| address.strip_prefix("0X"))?;
	let valid = !digits.is_empty()
		&& digits.len() <= 64
		&& digits.chars().all(|c| c.is_ascii_hexdigit());
	valid.then_some(digits)
}

/// Checks whether a string is a valid Starknet address
///
/// The address must be `0x` followed by 1 to 64 hex digits and its value must be
/// below 2^251.
pub fn is_valid_starknet_address(address: &str) -> bool {
	felt_digits(address)
		.and_then(|digits| U256::from_str_radix(digits, 16).ok())
		.is_some_and(|value| value < U256::from(1u8) << 251)
}

/// Lowercase, zero padded to 64 hex digits; the input unchanged when invalid
pub fn normalize_starknet_address(address: &str) -> String {
	if !is_valid_starknet_address(address) {
		return address.to_string();
	}
	match felt_digits(address) {
		Some(digits) => format!("0x{:0>64}", digits.to_lowercase()),
		None => address.to_string(),
	}
}

fn felt_at(values: &[Value], index: usize) -> Option<U256> {
	values
		.get(index)?
		.as_str()
		.and_then(|felt| parse_hex_u256(felt).ok())
}

fn address_at(values: &[Value], index: usize) -> Option<String> {
	let felt = values.get(index)?.as_str()?;
	is_valid_starknet_address(felt).then(|| normalize_starknet_address(felt))
}

/// Combines the two 128 bit halves of a Cairo `u256`
fn u256_from_halves(low: U256, high: U256) -> U256 {
	low.saturating_add(high.wrapping_shl(128))
}

/// Decodes a `Transfer` event emitted in either layout
///
/// Returns `None` when the event is not a well formed transfer.
pub fn decode_transfer_event(event: &Value) -> Option<TransferEvent> {
	let keys = event.get("keys")?.as_array()?;
	let data = event.get("data")?.as_array()?;

	let (from, to, low, high) = if keys.len() >= 3 && data.len() >= 2 {
		(
			address_at(keys, 1)?,
			address_at(keys, 2)?,
			felt_at(data, 0)?,
			felt_at(data, 1)?,
		)
	} else if keys.len() == 1 && data.len() >= 4 {
		(
			address_at(data, 0)?,
			address_at(data, 1)?,
			felt_at(data, 2)?,
			felt_at(data, 3)?,
		)
	} else {
		return None;
	};

	Some(TransferEvent {
		from,
		to,
		amount: u256_from_halves(low, high),
	})
}

/// Reads a block number that may be encoded as a JSON number or a hex string
pub fn block_number_of(value: &Value) -> Option<u64> {
	value
		.as_u64()
		.or_else(|| value.as_str().and_then(|hex| parse_hex_u64(hex).ok()))
}
