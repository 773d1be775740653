//! Environment driven monitor configuration.

use std::time::Duration;

use crate::models::{ChainType, Network, RpcUrl};

use super::error::ConfigError;

/// Default wall-clock bound of a single wallet scan
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 60;

const SCAN_TIMEOUT_ENV: &str = "WALLET_MONITOR_SCAN_TIMEOUT_SECS";

/// Static description of a chain the monitor knows how to handle
struct ChainDefinition {
	slug: &'static str,
	name: &'static str,
	env_prefix: &'static str,
	chain_type: ChainType,
	native_symbol: &'static str,
	native_decimals: u8,
	lookback: u64,
	max_scan_blocks: u64,
}

/// Known chains, in registration order
const CHAIN_DEFINITIONS: [ChainDefinition; 4] = [
	ChainDefinition {
		slug: "starknet",
		name: "Starknet",
		env_prefix: "STARKNET",
		chain_type: ChainType::Starknet,
		native_symbol: "ETH",
		native_decimals: 18,
		lookback: 100,
		max_scan_blocks: 1000,
	},
	ChainDefinition {
		slug: "ethereum",
		name: "Ethereum",
		env_prefix: "ETHEREUM",
		chain_type: ChainType::Evm,
		native_symbol: "ETH",
		native_decimals: 18,
		lookback: 50,
		max_scan_blocks: 500,
	},
	ChainDefinition {
		slug: "polygon",
		name: "Polygon",
		env_prefix: "POLYGON",
		chain_type: ChainType::Evm,
		native_symbol: "POL",
		native_decimals: 18,
		lookback: 50,
		max_scan_blocks: 500,
	},
	ChainDefinition {
		slug: "solana",
		name: "Solana",
		env_prefix: "SOLANA",
		chain_type: ChainType::Solana,
		native_symbol: "SOL",
		native_decimals: 9,
		lookback: 50,
		max_scan_blocks: 0,
	},
];

/// Runtime configuration of the wallet monitor
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
	/// Configured networks, in registration order
	pub networks: Vec<Network>,
	/// Wall-clock bound of a single scan
	pub scan_timeout: Duration,
}

impl Default for MonitorConfig {
	fn default() -> Self {
		Self {
			networks: Vec::new(),
			scan_timeout: Duration::from_secs(DEFAULT_SCAN_TIMEOUT_SECS),
		}
	}
}

impl MonitorConfig {
	/// Loads the configuration from the process environment
	///
	/// # Errors
	/// Returns `ConfigError::ParseError` when a numeric setting is malformed
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Loads the configuration from an arbitrary key/value source
	///
	/// For every known chain `<PREFIX>_RPC_URL` holds one or more comma separated
	/// endpoints; the first endpoint is preferred and the others are fallbacks.
	/// `<PREFIX>_LOOKBACK` optionally overrides the default scan window.
	/// Chains without an endpoint are left out.
	///
	/// # Arguments
	/// * `lookup` - Returns the value of a variable, if set
	///
	/// # Errors
	/// Returns `ConfigError::ParseError` when a numeric setting is malformed
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let scan_timeout = match non_empty(lookup(SCAN_TIMEOUT_ENV)) {
			Some(value) => Duration::from_secs(parse_u64(SCAN_TIMEOUT_ENV, &value)?),
			None => Duration::from_secs(DEFAULT_SCAN_TIMEOUT_SECS),
		};

		let mut networks = Vec::new();
		for definition in CHAIN_DEFINITIONS.iter() {
			let url_key = format!("{}_RPC_URL", definition.env_prefix);
			let Some(raw_urls) = non_empty(lookup(&url_key)) else {
				continue;
			};

			let urls: Vec<&str> = raw_urls
				.split(',')
				.map(str::trim)
				.filter(|url| !url.is_empty())
				.collect();
			if urls.is_empty() {
				continue;
			}

			let lookback_key = format!("{}_LOOKBACK", definition.env_prefix);
			let lookback = match non_empty(lookup(&lookback_key)) {
				Some(value) => parse_u64(&lookback_key, &value)?,
				None => definition.lookback,
			};

			let total = urls.len() as u32;
			let rpc_urls = urls
				.into_iter()
				.enumerate()
				.map(|(idx, url)| RpcUrl {
					url: url.to_string(),
					weight: 100 + total - idx as u32,
				})
				.collect();

			networks.push(Network {
				chain_type: definition.chain_type,
				slug: definition.slug.to_string(),
				name: definition.name.to_string(),
				rpc_urls,
				native_symbol: definition.native_symbol.to_string(),
				native_decimals: definition.native_decimals,
				lookback,
				max_scan_blocks: definition.max_scan_blocks.max(lookback),
			});
		}

		Ok(Self {
			networks,
			scan_timeout,
		})
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
	value
		.parse::<u64>()
		.map_err(|e| ConfigError::parse_error(format!("{} must be an integer: {}", key, e)))
}
