//! Core chain provider interface.
//!
//! This module defines the capability set every chain family implements, plus the
//! scan plumbing shared by the implementations: window resolution and conversion of
//! a finished (or failed, or timed out) scan into a `WalletMonitorResult`.

use async_trait::async_trait;
use std::{future::Future, time::Duration};

use crate::{
	models::{ScannedBlocks, Transaction, WalletMonitorResult},
	services::blockchain::ProviderError,
};

/// Error string of a scan that could not establish its window
pub const SCAN_FAILED_ERROR: &str = "Failed to fetch wallet transactions";

/// Error string of a scan that exceeded its deadline
pub const SCAN_TIMEOUT_ERROR: &str = "Scan timed out";

/// Defines the capability set of a chain provider
///
/// Implementations never panic on malformed input and never return errors: every
/// failure is folded into a boolean or a structured `WalletMonitorResult`.
#[async_trait]
pub trait ChainProvider: Send + Sync {
	/// Checks the syntax of an address without touching the network
	fn is_valid_address(&self, address: &str) -> bool;

	/// Converts an address to the chain's canonical form
	///
	/// Returns the input unchanged when it cannot be parsed. Applying it twice gives
	/// the same result as applying it once.
	fn normalize_address(&self, address: &str) -> String;

	/// Lightweight liveness probe against the RPC endpoint
	async fn test_connection(&self) -> bool;

	/// Scans an address for inbound transfers
	///
	/// # Arguments
	/// * `address` - The monitored wallet
	/// * `from_block` - First block (or slot) to include; a default lookback applies when None
	async fn monitor_wallet_transactions(
		&self,
		address: &str,
		from_block: Option<u64>,
	) -> WalletMonitorResult;
}

/// Transfers collected by a provider scan, before ordering
#[derive(Debug, Default)]
pub struct WalletScan {
	pub transactions: Vec<Transaction>,
	pub scanned_blocks: ScannedBlocks,
}

/// Runs a scan under a deadline and converts its outcome into a result
///
/// # Arguments
/// * `wallet_address` - Canonical form of the monitored address, echoed in the result
/// * `scan_timeout` - Wall-clock bound of the whole scan
/// * `scan` - The provider specific scan
pub async fn run_scan<F>(
	wallet_address: &str,
	scan_timeout: Duration,
	scan: F,
) -> WalletMonitorResult
where
	F: Future<Output = Result<WalletScan, ProviderError>> + Send,
{
	match tokio::time::timeout(scan_timeout, scan).await {
		Ok(Ok(scan)) => {
			tracing::info!(
				wallet = wallet_address,
				transactions = scan.transactions.len(),
				from = scan.scanned_blocks.from,
				to = scan.scanned_blocks.to,
				"Wallet scan completed"
			);
			WalletMonitorResult::success(wallet_address, scan.transactions, scan.scanned_blocks)
		}
		Ok(Err(e)) => {
			tracing::error!(wallet = wallet_address, error = %e, "Wallet scan failed");
			WalletMonitorResult::error(wallet_address, SCAN_FAILED_ERROR, Some(e.to_string()))
		}
		Err(_) => {
			tracing::error!(
				wallet = wallet_address,
				timeout_secs = scan_timeout.as_secs(),
				"Wallet scan timed out"
			);
			WalletMonitorResult::error(
				wallet_address,
				SCAN_TIMEOUT_ERROR,
				Some(format!(
					"Scan did not finish within {} seconds",
					scan_timeout.as_secs()
				)),
			)
		}
	}
}

/// Resolves the inclusive block window of a scan
///
/// Without a starting block the window is the last `lookback` blocks up to `head`.
/// With one, the window runs from it to `head`, trimmed to the newest `max_blocks`
/// blocks. A starting block past `head` yields an empty window (`from > to`).
pub fn resolve_block_window(
	head: u64,
	from_block: Option<u64>,
	lookback: u64,
	max_blocks: u64,
) -> ScannedBlocks {
	let lookback = lookback.max(1);
	match from_block {
		None => ScannedBlocks::new(head.saturating_sub(lookback - 1), head),
		Some(from) if from > head => ScannedBlocks::new(from, head),
		Some(from) => {
			let max_blocks = max_blocks.max(1);
			if head - from + 1 > max_blocks {
				let clamped = head + 1 - max_blocks;
				tracing::warn!(
					requested_from = from,
					clamped_from = clamped,
					head,
					"Requested scan window exceeds the block cap, scanning the newest blocks only"
				);
				ScannedBlocks::new(clamped, head)
			} else {
				ScannedBlocks::new(from, head)
			}
		}
	}
}

/// Current unix time in seconds, used when a chain does not expose a timestamp
pub fn now_timestamp() -> i64 {
	chrono::Utc::now().timestamp()
}
