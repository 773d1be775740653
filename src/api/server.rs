//! API server module
//!
//! A thin actix-web layer over a shared `BlockchainManager`.

use actix_web::middleware::{Compress, DefaultHeaders, NormalizePath};
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::services::blockchain::BlockchainManager;

type ManagerData = web::Data<Arc<BlockchainManager>>;

/// Body of a monitor request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorRequest {
	#[serde(default)]
	pub chain: Option<String>,
	#[serde(default)]
	pub wallet_address: Option<String>,
	#[serde(default)]
	pub from_block: Option<u64>,
}

fn required(value: &Option<String>) -> Option<&str> {
	value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Scans a wallet and returns the result, including error results, with a 200
async fn monitor_handler(
	manager: ManagerData,
	request: web::Json<MonitorRequest>,
) -> impl Responder {
	let (Some(chain), Some(wallet_address)) = (
		required(&request.chain),
		required(&request.wallet_address),
	) else {
		return HttpResponse::BadRequest()
			.json(json!({"error": "chain and walletAddress are required"}));
	};

	let result = manager
		.monitor_wallet(chain, wallet_address, request.from_block)
		.await;
	HttpResponse::Ok().json(result)
}

async fn chains_handler(manager: ManagerData) -> impl Responder {
	HttpResponse::Ok().json(json!({"chains": manager.get_supported_chains()}))
}

async fn health_handler(manager: ManagerData) -> impl Responder {
	HttpResponse::Ok().json(json!({"connections": manager.test_all_connections().await}))
}

/// Registers the API routes on an app
pub fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(
		web::scope("/api")
			.route("/monitor", web::post().to(monitor_handler))
			.route("/chains", web::get().to(chains_handler))
			.route("/health", web::get().to(health_handler)),
	);
}

/// Creates the API server
///
/// # Arguments
/// * `bind_address` - `HOST:PORT` to listen on
/// * `manager` - Manager shared by every worker
pub fn create_api_server(
	bind_address: &str,
	manager: Arc<BlockchainManager>,
) -> std::io::Result<actix_web::dev::Server> {
	info!("Starting API server on {}", bind_address);

	Ok(HttpServer::new(move || {
		App::new()
			.wrap(Compress::default())
			.wrap(NormalizePath::trim())
			.wrap(DefaultHeaders::new())
			.app_data(web::Data::new(manager.clone()))
			.configure(configure)
	})
	.bind(bind_address)?
	.shutdown_timeout(5)
	.run())
}
