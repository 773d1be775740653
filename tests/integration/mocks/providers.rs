//! Mock implementation of the chain provider trait.

use async_trait::async_trait;
use mockall::mock;

use wallet_monitor::{models::WalletMonitorResult, services::blockchain::ChainProvider};

mock! {
	/// Mock implementation of the chain provider trait.
	///
	/// Lets the manager be tested without any transport or network access.
	pub ChainProvider {}

	#[async_trait]
	impl ChainProvider for ChainProvider {
		fn is_valid_address(&self, address: &str) -> bool;
		fn normalize_address(&self, address: &str) -> String;
		async fn test_connection(&self) -> bool;
		async fn monitor_wallet_transactions(
			&self,
			address: &str,
			from_block: Option<u64>,
		) -> WalletMonitorResult;
	}
}
