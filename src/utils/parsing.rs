//! Parsing utilities
//!
//! Helpers for the numeric encodings found in JSON-RPC payloads and for rendering
//! on-chain integer amounts as decimal strings.

use alloy::primitives::U256;

/// Parses a `0x` prefixed hex quantity into a `u64`
///
/// An empty quantity (`"0x"`) parses as zero.
pub fn parse_hex_u64(value: &str) -> Result<u64, String> {
	let digits = value
		.strip_prefix("0x")
		.or_else(|| value.strip_prefix("0X"))
		.ok_or_else(|| format!("Missing 0x prefix in quantity '{}'", value))?;
	if digits.is_empty() {
		return Ok(0);
	}
	u64::from_str_radix(digits, 16).map_err(|e| format!("Invalid hex quantity '{}': {}", value, e))
}

/// Parses a `0x` prefixed hex quantity into a `U256`
///
/// An empty quantity (`"0x"`) parses as zero.
pub fn parse_hex_u256(value: &str) -> Result<U256, String> {
	let digits = value
		.strip_prefix("0x")
		.or_else(|| value.strip_prefix("0X"))
		.ok_or_else(|| format!("Missing 0x prefix in quantity '{}'", value))?;
	if digits.is_empty() {
		return Ok(U256::ZERO);
	}
	U256::from_str_radix(digits, 16).map_err(|e| format!("Invalid hex quantity '{}': {}", value, e))
}

/// Renders an integer amount of base units as a decimal string
///
/// Trailing fractional zeros are removed, so `1_500_000_000_000_000_000` with 18
/// decimals renders as `"1.5"` and a whole amount has no decimal point.
pub fn format_units(value: U256, decimals: u8) -> String {
	let digits = value.to_string();
	let decimals = decimals as usize;
	if decimals == 0 {
		return digits;
	}

	let padded = if digits.len() <= decimals {
		format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
	} else {
		digits
	};

	let (whole, fraction) = padded.split_at(padded.len() - decimals);
	let fraction = fraction.trim_end_matches('0');
	if fraction.is_empty() {
		whole.to_string()
	} else {
		format!("{}.{}", whole, fraction)
	}
}
