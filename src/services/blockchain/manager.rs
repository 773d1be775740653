//! Blockchain manager for dispatching wallet scans.
//!
//! The manager owns the provider registry: an ordered list of chain identifiers and
//! the providers serving them. It is built once, either from configuration or by
//! injecting providers, and is read-only afterwards so it can be shared across tasks
//! behind an `Arc`.

use futures::future::join_all;
use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::{
	models::{ChainType, MonitorConfig, Network, WalletMonitorResult},
	services::blockchain::{
		providers::{EvmProvider, SolanaProvider, StarknetProvider},
		ChainProvider, ProviderError,
	},
};

/// Creates the provider serving a network
///
/// # Errors
/// Returns `ProviderError::ConnectionError` when the network has no usable endpoint
pub fn create_provider(
	network: &Network,
	scan_timeout: Duration,
) -> Result<Arc<dyn ChainProvider>, ProviderError> {
	let provider: Arc<dyn ChainProvider> = match network.chain_type {
		ChainType::Evm => Arc::new(EvmProvider::new(network, scan_timeout)?),
		ChainType::Solana => Arc::new(SolanaProvider::new(network, scan_timeout)?),
		ChainType::Starknet => Arc::new(StarknetProvider::new(network, scan_timeout)?),
	};
	Ok(provider)
}

/// Registry of chain providers and entry point of every wallet scan
#[derive(Clone, Default)]
pub struct BlockchainManager {
	/// Registered providers, in registration order
	providers: Vec<(String, Arc<dyn ChainProvider>)>,
}

impl BlockchainManager {
	/// Creates a manager with no registered chain
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a provider under a chain identifier
	///
	/// The identifier is stored lowercase. Registering an identifier twice replaces
	/// the provider and keeps the original position.
	pub fn with_provider(mut self, chain: &str, provider: Arc<dyn ChainProvider>) -> Self {
		let chain = canonical_chain_id(chain);
		match self.providers.iter_mut().find(|(id, _)| *id == chain) {
			Some(entry) => entry.1 = provider,
			None => self.providers.push((chain, provider)),
		}
		self
	}

	/// Builds the registry from configuration
	///
	/// Networks that fail validation or whose provider cannot be created are logged
	/// and left out; the remaining chains are registered in configuration order.
	pub fn from_config(config: &MonitorConfig) -> Self {
		let mut manager = Self::new();

		for network in &config.networks {
			if let Err(e) = network.validate() {
				tracing::error!(chain = %network.slug, error = %e, "Skipping misconfigured chain");
				continue;
			}

			match create_provider(network, config.scan_timeout) {
				Ok(provider) => {
					tracing::info!(
						chain = %network.slug,
						chain_type = %network.chain_type,
						endpoints = network.rpc_urls.len(),
						"Registered chain provider"
					);
					manager = manager.with_provider(&network.slug, provider);
				}
				Err(e) => {
					tracing::error!(chain = %network.slug, error = %e, "Failed to create chain provider");
				}
			}
		}

		manager
	}

	fn get_provider(&self, chain: &str) -> Option<&Arc<dyn ChainProvider>> {
		let chain = canonical_chain_id(chain);
		self.providers
			.iter()
			.find(|(id, _)| *id == chain)
			.map(|(_, provider)| provider)
	}

	/// Chain identifiers with a registered provider, in registration order
	pub fn get_supported_chains(&self) -> Vec<String> {
		self.providers.iter().map(|(id, _)| id.clone()).collect()
	}

	/// Scans a wallet on a chain for inbound transfers
	///
	/// Unknown chains and invalid addresses are answered with an error result without
	/// any network call. Otherwise the provider's result is returned as is.
	///
	/// # Arguments
	/// * `chain` - Chain identifier, matched case-insensitively
	/// * `address` - Wallet address in any form the chain accepts
	/// * `from_block` - First block (or slot) to include
	pub async fn monitor_wallet(
		&self,
		chain: &str,
		address: &str,
		from_block: Option<u64>,
	) -> WalletMonitorResult {
		let Some(provider) = self.get_provider(chain) else {
			tracing::warn!(chain, "Monitor request for unsupported chain");
			let supported = match self.get_supported_chains() {
				chains if chains.is_empty() => "none".to_string(),
				chains => chains.join(", "),
			};
			return WalletMonitorResult::error(
				address,
				format!(
					"Unsupported chain: {}. Supported chains: {}",
					chain.trim(),
					supported
				),
				None,
			);
		};

		if !provider.is_valid_address(address) {
			tracing::warn!(chain, address, "Monitor request with invalid address");
			return WalletMonitorResult::error(
				address,
				format!("Invalid address for chain {}", canonical_chain_id(chain)),
				None,
			);
		}

		provider.monitor_wallet_transactions(address, from_block).await
	}

	/// Probes every registered chain concurrently
	///
	/// Each probe runs in its own task; a probe that fails or panics reports `false`
	/// without affecting the others.
	pub async fn test_all_connections(&self) -> HashMap<String, bool> {
		let probes = self.providers.iter().map(|(chain, provider)| {
			let chain = chain.clone();
			let provider = Arc::clone(provider);
			async move {
				let handle = tokio::spawn(async move { provider.test_connection().await });
				let connected = match handle.await {
					Ok(connected) => connected,
					Err(e) => {
						tracing::error!(chain = %chain, error = %e, "Connection probe panicked");
						false
					}
				};
				(chain, connected)
			}
		});

		join_all(probes).await.into_iter().collect()
	}
}

fn canonical_chain_id(chain: &str) -> String {
	chain.trim().to_lowercase()
}
