//! Outcome of a single monitor call.

use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// Status tag of a monitor call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WalletMonitorStatus {
	Success,
	Error,
}

/// Inclusive block range covered by a scan
///
/// Both bounds are 0 when the provider does not scan by block range.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScannedBlocks {
	pub from: u64,
	pub to: u64,
}

impl ScannedBlocks {
	pub fn new(from: u64, to: u64) -> Self {
		Self { from, to }
	}
}

/// Result of scanning a wallet for inbound transfers
///
/// Results are built through [`WalletMonitorResult::success`] and
/// [`WalletMonitorResult::error`], which keep the transaction list ordered newest
/// first, keep `total_transactions` in line with it and guarantee an error result
/// never carries transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletMonitorResult {
	pub status: WalletMonitorStatus,
	pub wallet_address: String,
	pub transactions: Vec<Transaction>,
	pub total_transactions: usize,
	pub scanned_blocks: ScannedBlocks,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub details: Option<String>,
}

impl WalletMonitorResult {
	/// Creates a successful result
	///
	/// Transactions are sorted by block, newest first. Transactions sharing a block
	/// keep the order they were discovered in.
	pub fn success(
		wallet_address: impl Into<String>,
		mut transactions: Vec<Transaction>,
		scanned_blocks: ScannedBlocks,
	) -> Self {
		transactions.sort_by(|a, b| b.block.cmp(&a.block));
		Self {
			status: WalletMonitorStatus::Success,
			wallet_address: wallet_address.into(),
			total_transactions: transactions.len(),
			transactions,
			scanned_blocks,
			error: None,
			details: None,
		}
	}

	/// Creates an error result with an empty transaction list
	pub fn error(
		wallet_address: impl Into<String>,
		error: impl Into<String>,
		details: Option<String>,
	) -> Self {
		Self {
			status: WalletMonitorStatus::Error,
			wallet_address: wallet_address.into(),
			transactions: Vec::new(),
			total_transactions: 0,
			scanned_blocks: ScannedBlocks::default(),
			error: Some(error.into()),
			details,
		}
	}

	pub fn is_success(&self) -> bool {
		self.status == WalletMonitorStatus::Success
	}
}
