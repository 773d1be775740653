use url::Url;

use crate::models::{ChainType, Network};

use super::error::ConfigError;

impl Network {
	/// Checks that the network can be handed to a provider
	///
	/// # Errors
	/// Returns `ConfigError::ValidationError` when the slug is not lowercase
	/// alphanumeric, no usable RPC endpoint is configured, an endpoint is not an
	/// http(s) URL, or the scan bounds are zero.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.slug.is_empty()
			|| !self
				.slug
				.chars()
				.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
		{
			return Err(ConfigError::validation_error(format!(
				"Slug '{}' must contain only lowercase letters, numbers, and underscores",
				self.slug
			)));
		}

		if self.ordered_rpc_urls().is_empty() {
			return Err(ConfigError::validation_error(format!(
				"Network '{}' has no usable RPC URL",
				self.slug
			)));
		}

		for rpc_url in &self.rpc_urls {
			let parsed = Url::parse(&rpc_url.url).map_err(|e| {
				ConfigError::validation_error(format!(
					"Invalid RPC URL for network '{}': {}",
					self.slug, e
				))
			})?;
			if !matches!(parsed.scheme(), "http" | "https") {
				return Err(ConfigError::validation_error(format!(
					"RPC URL for network '{}' must use http or https",
					self.slug
				)));
			}
		}

		if self.lookback == 0 {
			return Err(ConfigError::validation_error(format!(
				"Lookback of network '{}' must be greater than zero",
				self.slug
			)));
		}

		// Solana scans by signature, the block cap does not apply there
		if self.chain_type != ChainType::Solana && self.max_scan_blocks == 0 {
			return Err(ConfigError::validation_error(format!(
				"Max scan blocks of network '{}' must be greater than zero",
				self.slug
			)));
		}

		Ok(())
	}
}
