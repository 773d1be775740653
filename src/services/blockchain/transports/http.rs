//! HTTP transport implementation for chain providers.
//!
//! This module provides the JSON-RPC over HTTP client shared by every provider,
//! supporting:
//! - Multiple RPC endpoints with automatic failover
//! - Retries of transient failures with exponential backoff
//! - Per-request timeouts

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::{
	models::Network,
	services::blockchain::transports::{
		BlockchainTransport, EndpointManager, RotatingTransport, TransportError,
	},
	utils::http::{create_retryable_http_client, HttpRetryConfig},
};

/// Basic HTTP transport client for JSON-RPC interactions
///
/// Construction does not touch the network; connectivity problems surface on the
/// first request. The client is cheap to clone and can be shared across tasks.
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	/// Plain HTTP client, used for connection probes during rotation
	client: Client,
	/// Manages RPC endpoint rotation and request handling for high availability
	endpoint_manager: EndpointManager,
	/// The stringified JSON-RPC payload used to probe a fallback endpoint
	test_connection_payload: String,
}

impl HttpTransportClient {
	/// Creates a new HTTP transport client for a network
	///
	/// # Arguments
	/// * `network` - Network configuration containing RPC URLs and weights
	/// * `test_connection_payload` - JSON-RPC payload sent when probing a fallback endpoint
	///
	/// # Returns
	/// * `Result<Self, anyhow::Error>` - New client instance, or an error when no endpoint is
	///   a valid URL or the HTTP client cannot be built
	pub fn new(network: &Network, test_connection_payload: &str) -> Result<Self, anyhow::Error> {
		let rpc_urls: Vec<String> = network
			.ordered_rpc_urls()
			.into_iter()
			.filter(|url| Url::parse(url).is_ok())
			.collect();

		let (active_url, fallback_urls) = rpc_urls
			.split_first()
			.map(|(first, rest)| (first.clone(), rest.to_vec()))
			.ok_or_else(|| anyhow::anyhow!("No valid RPC URL for network {}", network.slug))?;

		serde_json::from_str::<Value>(test_connection_payload)
			.context("Failed to parse test payload as JSON")?;

		let http_client = reqwest::ClientBuilder::new()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(32)
			.timeout(Duration::from_secs(30))
			.connect_timeout(Duration::from_secs(20))
			.build()
			.context("Failed to create HTTP client")?;

		let retrying_client =
			create_retryable_http_client(&HttpRetryConfig::default(), http_client.clone());

		Ok(Self {
			client: http_client,
			endpoint_manager: EndpointManager::new(retrying_client, &active_url, fallback_urls),
			test_connection_payload: test_connection_payload.to_string(),
		})
	}
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	/// Retrieves the currently active RPC endpoint URL
	async fn get_current_url(&self) -> String {
		self.endpoint_manager.active_url.read().await.clone()
	}

	/// Sends a JSON-RPC request to the active endpoint, rotating on failure
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		self.endpoint_manager
			.send_raw_request(self, method, params)
			.await
	}
}

#[async_trait]
impl RotatingTransport for HttpTransportClient {
	/// Tests connectivity to a specific RPC endpoint
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error> {
		let url = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL: {}", url))?;

		let response = self
			.client
			.post(url.clone())
			.header("Content-Type", "application/json")
			.body(self.test_connection_payload.clone())
			.send()
			.await
			.map_err(|e| anyhow::anyhow!("Failed to connect to {}: {}", url, e))?;

		if response.status().is_success() {
			Ok(())
		} else {
			Err(anyhow::anyhow!(
				"Failed to connect to {}: {}",
				url,
				response.status().as_u16()
			))
		}
	}

	/// Updates the active endpoint URL
	///
	/// The HTTP client is endpoint agnostic, so only the endpoint manager's active URL
	/// changes.
	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error> {
		let parsed_url = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL: {}", url))?;
		let normalized_url = parsed_url.as_str().trim_end_matches('/');

		let mut active_url = self.endpoint_manager.active_url.write().await;
		*active_url = normalized_url.to_string();
		Ok(())
	}
}
