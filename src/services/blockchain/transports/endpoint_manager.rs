//! Endpoint selection for JSON-RPC transports.
//!
//! A network lists one or more RPC endpoints. The highest weighted one starts as
//! active; the others wait in a fallback queue and are swapped in when the active
//! endpoint is unreachable or rate limits the caller.

use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::services::blockchain::transports::{
	RotatingTransport, TransportError, ROTATE_ON_ERROR_CODES,
};

/// Active endpoint plus its fallback queue
///
/// Rotation moves the first usable fallback to the active slot and queues the
/// previous active endpoint at the back, so endpoints are tried round robin.
#[derive(Clone, Debug)]
pub struct EndpointManager {
	/// Endpoint every request is sent to
	pub active_url: Arc<RwLock<String>>,
	/// Endpoints waiting to be rotated in, oldest first
	pub fallback_urls: Arc<RwLock<Vec<String>>>,
	client: ClientWithMiddleware,
	rotation_lock: Arc<Mutex<()>>,
}

impl EndpointManager {
	/// Creates a manager sending requests through `client`
	pub fn new(client: ClientWithMiddleware, active_url: &str, fallback_urls: Vec<String>) -> Self {
		Self {
			active_url: Arc::new(RwLock::new(active_url.to_string())),
			fallback_urls: Arc::new(RwLock::new(fallback_urls)),
			client,
			rotation_lock: Arc::new(Mutex::new(())),
		}
	}

	/// Takes the first queued endpoint that differs from `active`
	async fn take_fallback(&self, active: &str) -> Option<String> {
		let mut queue = self.fallback_urls.write().await;
		let index = queue.iter().position(|url| url != active)?;
		Some(queue.remove(index))
	}

	/// Switches the transport to the next reachable fallback endpoint
	///
	/// # Errors
	/// - `UrlRotation` when the queue holds no other endpoint
	/// - `UrlRotation` when the candidate endpoint does not answer; it is queued again
	pub async fn rotate_url<T: RotatingTransport>(&self, transport: &T) -> Result<(), TransportError> {
		let _rotation = self.rotation_lock.lock().await;
		let previous = self.active_url.read().await.clone();

		let Some(candidate) = self.take_fallback(&previous).await else {
			return Err(TransportError::url_rotation(
				format!("No fallback URLs available for rotation. Current active URL: {previous}"),
				None,
			));
		};

		if let Err(e) = transport.try_connect(&candidate).await {
			tracing::debug!(url = %candidate, error = %e, "Fallback endpoint unreachable");
			let message = format!(
				"Failed to connect to new URL: {candidate}. Retaining it in fallback list."
			);
			self.fallback_urls.write().await.push(candidate);
			return Err(TransportError::url_rotation(message, None));
		}

		if let Err(e) = transport.update_client(&candidate).await {
			self.fallback_urls.write().await.push(candidate);
			return Err(TransportError::url_rotation(
				"Failed to update transport client with new URL",
				Some(e.into()),
			));
		}

		tracing::info!(from = %previous, to = %candidate, "Rotated RPC endpoint");
		self.fallback_urls.write().await.push(previous);
		*self.active_url.write().await = candidate;
		Ok(())
	}

	/// Rotates after a failed request when the failure calls for it
	///
	/// `status` is `None` for network failures, which always qualify. Returns whether
	/// the request should be sent again.
	async fn rotate_after_failure<T: RotatingTransport>(
		&self,
		transport: &T,
		status: Option<u16>,
	) -> Result<bool, TransportError> {
		let rotatable = status.map_or(true, |code| ROTATE_ON_ERROR_CODES.contains(&code));
		if !rotatable || self.fallback_urls.read().await.is_empty() {
			return Ok(false);
		}
		self.rotate_url(transport).await?;
		Ok(true)
	}

	/// Sends a JSON-RPC call to the active endpoint
	///
	/// Network failures and rate limited responses move on to the next fallback and
	/// resend the call; other HTTP errors are returned as is. The call is sent at
	/// most once per configured endpoint.
	///
	/// # Arguments
	/// * `transport` - Transport building the request body and owning the endpoint
	/// * `method` - JSON-RPC method name
	/// * `params` - JSON-RPC params, omitted when `None`
	pub async fn send_raw_request<
		T: RotatingTransport,
		P: Into<Value> + Send + Clone + Serialize,
	>(
		&self,
		transport: &T,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError> {
		let request = transport.customize_request(method, params).await;
		let body = serde_json::to_vec(&request).map_err(|e| {
			TransportError::request_serialization("Failed to serialize request JSON", Some(Box::new(e)))
		})?;
		let endpoints = self.fallback_urls.read().await.len() + 1;

		for attempt in 1..=endpoints {
			let url = self.active_url.read().await.clone();
			let last_attempt = attempt == endpoints;

			let response = match self
				.client
				.post(url.as_str())
				.header("Content-Type", "application/json")
				.body(body.clone())
				.send()
				.await
			{
				Ok(response) => response,
				Err(e) => {
					tracing::warn!(method, url = %url, error = %e, "RPC request failed");
					if !last_attempt && self.rotate_after_failure(transport, None).await? {
						continue;
					}
					return Err(TransportError::network(
						format!("Failed to send {method} request"),
						Some(Box::new(e)),
					));
				}
			};

			let status = response.status().as_u16();
			if !response.status().is_success() {
				let text = response.text().await.unwrap_or_default();
				tracing::warn!(method, url = %url, status, body = %text, "RPC endpoint answered with an error");
				if !last_attempt && self.rotate_after_failure(transport, Some(status)).await? {
					continue;
				}
				return Err(TransportError::http(status, url, text));
			}

			return response.json().await.map_err(|e| {
				TransportError::response_parse("Failed to parse JSON response", Some(Box::new(e)))
			});
		}

		Err(TransportError::network(
			format!("No endpoint left to send {method} request"),
			None,
		))
	}
}
