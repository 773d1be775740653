//! Helper functions for EVM-specific operations.
//!
//! This module provides utility functions for working with EVM addresses, log topics
//! and the ABI encoded return values of ERC-20 metadata calls.

use alloy::{
	primitives::{Address, B256, U256},
	sol_types::SolValue,
};
use std::str::FromStr;

/// keccak256("Transfer(address,address,uint256)")
pub const TRANSFER_TOPIC: &str =
	"0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// Selector of `decimals()`
pub const DECIMALS_SELECTOR: &str = "0x313ce567";

/// Selector of `symbol()`
pub const SYMBOL_SELECTOR: &str = "0x95d89b41";

/// Checks whether a string is a syntactically valid EVM address
///
/// The address must be `0x` followed by 40 hex digits. All-lowercase and
/// all-uppercase digits are accepted as is; mixed case must carry a valid EIP-55
/// checksum.
pub fn is_valid_evm_address(address: &str) -> bool {
	let Some(digits) = address.strip_prefix("0x") else {
		return false;
	};
	if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
		return false;
	}

	let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
	let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
	if has_lower && has_upper {
		Address::parse_checksummed(address, None).is_ok()
	} else {
		true
	}
}

/// Parses an address string, ignoring checksum casing
pub fn parse_address(address: &str) -> Option<Address> {
	Address::from_str(address).ok()
}

/// Renders an address with EIP-55 checksum casing
pub fn checksum_address(address: &Address) -> String {
	address.to_checksum(None)
}

/// Left pads an address to a 32 byte log topic
pub fn address_to_topic(address: &Address) -> String {
	format!("0x{}", hex::encode(address.into_word()))
}

/// Extracts the address held in the low 20 bytes of a 32 byte topic
pub fn topic_to_address(topic: &str) -> Option<Address> {
	B256::from_str(topic).ok().map(Address::from_word)
}

/// Decodes the return value of `decimals()`
pub fn decode_decimals(result: &str) -> Option<u8> {
	let bytes = hex::decode(result.strip_prefix("0x").unwrap_or(result)).ok()?;
	if bytes.len() != 32 {
		return None;
	}
	u8::try_from(U256::from_be_slice(&bytes)).ok()
}

/// Decodes the return value of `symbol()`
///
/// Handles both the standard ABI `string` encoding and the `bytes32` encoding used
/// by a few early tokens.
pub fn decode_symbol(result: &str) -> Option<String> {
	let bytes = hex::decode(result.strip_prefix("0x").unwrap_or(result)).ok()?;

	let symbol = if bytes.len() == 32 {
		let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
		String::from_utf8(bytes[..end].to_vec()).ok()?
	} else {
		String::abi_decode(&bytes).ok()?
	};

	let symbol = symbol.trim().to_string();
	if symbol.is_empty() {
		None
	} else {
		Some(symbol)
	}
}
