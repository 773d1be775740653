//! Normalized inbound transfer record.

use serde::{Deserialize, Serialize};

/// Sender placeholder used when a provider cannot cheaply attribute a transfer
pub const UNKNOWN_SENDER: &str = "unknown";

/// Kind of a detected transfer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
	/// Movement of the chain's base asset (ETH, SOL, ...)
	NativeTransfer,
	/// Movement of a contract-tracked fungible token
	TokenTransfer,
	/// Call into the monitored address that moved no value
	ContractCall,
}

/// A single inbound transfer to a monitored wallet
///
/// `to` always equals the monitored address in its canonical form; providers only
/// build records for transfers whose destination is that address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
	/// Chain-native transaction identifier
	pub hash: String,
	/// Block height or slot the transaction was included in
	pub block: u64,
	/// Seconds since epoch
	pub timestamp: i64,
	/// Best-effort confirmation depth, 0 when unknown
	pub confirmations: u64,
	/// Sender address or [`UNKNOWN_SENDER`]
	pub from: String,
	/// Receiving (monitored) address
	pub to: String,
	/// Decimal amount, already scaled by the asset decimals
	pub amount: String,
	/// Token contract/mint, or the native symbol for native transfers
	pub token_address: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_symbol: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_decimals: Option<u8>,
	#[serde(rename = "type")]
	pub transaction_type: TransactionType,
}
