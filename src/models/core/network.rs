use serde::{Deserialize, Serialize};

use crate::models::ChainType;

/// A single RPC endpoint of a network
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RpcUrl {
	/// Endpoint URL
	pub url: String,
	/// Priority of the endpoint, higher weights are tried first
	pub weight: u32,
}

/// Configuration of a single monitored network
///
/// A network maps a chain identifier (its slug) to the provider family handling it
/// and the RPC endpoints that provider talks to.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Network {
	/// Provider family of the network
	pub chain_type: ChainType,
	/// Lowercase chain identifier, e.g. "ethereum"
	pub slug: String,
	/// Human readable name
	pub name: String,
	/// RPC endpoints; the heaviest is used first, the rest are fallbacks
	pub rpc_urls: Vec<RpcUrl>,
	/// Symbol of the native asset, e.g. "ETH"
	pub native_symbol: String,
	/// Decimals of the native asset
	pub native_decimals: u8,
	/// Default scan window when the caller does not give a starting block.
	/// Blocks for EVM and Starknet, signatures for Solana.
	pub lookback: u64,
	/// Upper bound on the number of blocks a single scan may cover
	pub max_scan_blocks: u64,
}

impl Network {
	/// Endpoint URLs ordered by descending weight, zero-weight endpoints excluded
	pub fn ordered_rpc_urls(&self) -> Vec<String> {
		let mut rpc_urls: Vec<_> = self
			.rpc_urls
			.iter()
			.filter(|rpc_url| rpc_url.weight > 0)
			.collect();

		rpc_urls.sort_by(|a, b| b.weight.cmp(&a.weight));
		rpc_urls.into_iter().map(|rpc_url| rpc_url.url.clone()).collect()
	}
}
