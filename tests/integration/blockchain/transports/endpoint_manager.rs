use mockito::Server;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

use wallet_monitor::services::blockchain::{
	BlockchainTransport, EndpointManager, RotatingTransport, TransportError,
};

// Transport stub recording the URL it was switched to
#[derive(Clone)]
struct StubTransport {
	client: reqwest::Client,
	current_url: Arc<RwLock<String>>,
}

impl StubTransport {
	fn new() -> Self {
		Self {
			client: reqwest::Client::new(),
			current_url: Arc::new(RwLock::new(String::new())),
		}
	}
}

#[async_trait::async_trait]
impl BlockchainTransport for StubTransport {
	async fn get_current_url(&self) -> String {
		self.current_url.read().await.clone()
	}

	async fn send_raw_request<P: Into<Value> + Send + Clone + Serialize>(
		&self,
		_method: &str,
		_params: Option<P>,
	) -> Result<Value, TransportError> {
		Ok(json!({"jsonrpc": "2.0", "result": "stubbed", "id": 1}))
	}
}

#[async_trait::async_trait]
impl RotatingTransport for StubTransport {
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error> {
		match self.client.post(url).send().await {
			Ok(response) if response.status().is_success() => Ok(()),
			Ok(response) => Err(anyhow::anyhow!("Status {}", response.status())),
			Err(e) => Err(anyhow::anyhow!("Failed to connect: {}", e)),
		}
	}

	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error> {
		*self.current_url.write().await = url.to_string();
		Ok(())
	}
}

fn plain_client() -> ClientWithMiddleware {
	ClientBuilder::new(reqwest::Client::new()).build()
}

#[tokio::test]
async fn test_send_raw_request() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.match_body(mockito::Matcher::PartialJson(json!({
			"jsonrpc": "2.0",
			"method": "eth_blockNumber",
			"params": []
		})))
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc": "2.0", "result": "0x10", "id": 1}"#)
		.create_async()
		.await;

	let manager = EndpointManager::new(plain_client(), &server.url(), vec![]);
	let result = manager
		.send_raw_request(&StubTransport::new(), "eth_blockNumber", Some(json!([])))
		.await
		.unwrap();

	assert_eq!(result["result"], "0x10");
	mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_rotates_to_fallback() {
	let mut primary = Server::new_async().await;
	let mut fallback = Server::new_async().await;

	let primary_mock = primary
		.mock("POST", "/")
		.with_status(429)
		.with_body("Rate limited")
		.expect(1)
		.create_async()
		.await;
	let fallback_mock = fallback
		.mock("POST", "/")
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(r#"{"jsonrpc": "2.0", "result": "success", "id": 1}"#)
		// Rotation check plus the resent call
		.expect(2)
		.create_async()
		.await;

	let manager = EndpointManager::new(plain_client(), &primary.url(), vec![fallback.url()]);
	let transport = StubTransport::new();
	let result = manager
		.send_raw_request(&transport, "getSlot", None::<Value>)
		.await
		.unwrap();

	assert_eq!(result["result"], "success");
	assert_eq!(&*manager.active_url.read().await, &fallback.url());
	assert_eq!(&*manager.fallback_urls.read().await, &vec![primary.url()]);
	assert_eq!(transport.get_current_url().await, fallback.url());
	primary_mock.assert_async().await;
	fallback_mock.assert_async().await;
}

#[tokio::test]
async fn test_client_error_is_not_rotated() {
	let mut primary = Server::new_async().await;
	let fallback = Server::new_async().await;

	let mock = primary
		.mock("POST", "/")
		.with_status(400)
		.with_body("bad request")
		.expect(1)
		.create_async()
		.await;

	let manager = EndpointManager::new(plain_client(), &primary.url(), vec![fallback.url()]);
	let result = manager
		.send_raw_request(&StubTransport::new(), "getSlot", None::<Value>)
		.await;

	match result {
		Err(TransportError::Http { status, url, body }) => {
			assert_eq!(status, 400);
			assert_eq!(url, primary.url());
			assert_eq!(body, "bad request");
		}
		other => panic!("Expected an HTTP error, got {:?}", other),
	}
	assert_eq!(&*manager.active_url.read().await, &primary.url());
	mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_without_fallback_is_an_http_error() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(429)
		.expect(1)
		.create_async()
		.await;

	let manager = EndpointManager::new(plain_client(), &server.url(), vec![]);
	let result = manager
		.send_raw_request(&StubTransport::new(), "starknet_blockNumber", None::<Value>)
		.await;

	assert!(matches!(result, Err(TransportError::Http { status: 429, .. })));
	mock.assert_async().await;
}

#[tokio::test]
async fn test_rotate_url_cycles_through_endpoints() {
	let mut first = Server::new_async().await;
	let mut second = Server::new_async().await;
	let _first_mock = first.mock("POST", "/").with_status(200).create_async().await;
	let _second_mock = second.mock("POST", "/").with_status(200).create_async().await;

	let manager = EndpointManager::new(plain_client(), &first.url(), vec![second.url()]);
	let transport = StubTransport::new();

	manager.rotate_url(&transport).await.unwrap();
	assert_eq!(&*manager.active_url.read().await, &second.url());

	manager.rotate_url(&transport).await.unwrap();
	assert_eq!(&*manager.active_url.read().await, &first.url());
	assert_eq!(&*manager.fallback_urls.read().await, &vec![second.url()]);
}

#[tokio::test]
async fn test_rotate_url_no_fallbacks() {
	let server = Server::new_async().await;
	let manager = EndpointManager::new(plain_client(), &server.url(), vec![]);

	let err = manager.rotate_url(&StubTransport::new()).await.unwrap_err();
	assert!(err.to_string().contains("No fallback URLs available"));
	assert_eq!(&*manager.active_url.read().await, &server.url());
}

#[tokio::test]
async fn test_rotate_url_connection_failure_keeps_fallback() {
	let server = Server::new_async().await;
	let unreachable = "http://127.0.0.1:1".to_string();
	let manager = EndpointManager::new(plain_client(), &server.url(), vec![unreachable.clone()]);

	let err = manager.rotate_url(&StubTransport::new()).await.unwrap_err();
	assert!(err.to_string().contains("Failed to connect to new URL"));
	assert_eq!(&*manager.active_url.read().await, &server.url());
	assert_eq!(&*manager.fallback_urls.read().await, &vec![unreachable]);
}

#[tokio::test]
async fn test_customize_request() {
	let transport = StubTransport::new();

	let request = transport
		.customize_request("getTransaction", Some(json!(["sig", {"encoding": "jsonParsed"}])))
		.await;
	assert_eq!(
		request,
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": "getTransaction",
			"params": ["sig", {"encoding": "jsonParsed"}]
		})
	);

	let request = transport.customize_request::<Value>("getSlot", None).await;
	assert_eq!(request["params"], Value::Null);
}
