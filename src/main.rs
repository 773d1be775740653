//! Wallet monitor entry point.
//!
//! This binary exposes the blockchain manager on the command line and over HTTP.
//! Chains are configured through environment variables (a `.env` file is loaded
//! when present):
//! - `STARKNET_RPC_URL`, `ETHEREUM_RPC_URL`, `POLYGON_RPC_URL`, `SOLANA_RPC_URL`
//! - `WALLET_MONITOR_SCAN_TIMEOUT_SECS`
//!
//! # Commands
//! - `monitor`: scan a wallet once and print the result as JSON
//! - `chains`: print the configured chains
//! - `health`: probe every configured chain
//! - `serve`: start the HTTP API

use clap::{Arg, ArgMatches, Command};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};

use wallet_monitor::{
	api::create_api_server,
	models::MonitorConfig,
	services::blockchain::BlockchainManager,
	utils::logging::{setup_logging, DEFAULT_LOG_LEVEL},
};

const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8080";

fn cli() -> Command {
	Command::new("wallet-monitor")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Scans wallets on Starknet, EVM-compatible chains and Solana for inbound transfers.")
		.subcommand_required(true)
		.arg_required_else_help(true)
		.arg(
			Arg::new("log-level")
				.long("log-level")
				.global(true)
				.help("Set log level (trace, debug, info, warn, error)")
				.value_name("LEVEL"),
		)
		.subcommand(
			Command::new("monitor")
				.about("Scan a wallet for inbound transfers")
				.arg(
					Arg::new("chain")
						.long("chain")
						.required(true)
						.help("Chain to scan (starknet, ethereum, polygon, solana)")
						.value_name("CHAIN"),
				)
				.arg(
					Arg::new("address")
						.long("address")
						.required(true)
						.help("Wallet address")
						.value_name("ADDRESS"),
				)
				.arg(
					Arg::new("from-block")
						.long("from-block")
						.help("First block (or slot) to include")
						.value_name("BLOCK_NUMBER")
						.value_parser(clap::value_parser!(u64)),
				),
		)
		.subcommand(Command::new("chains").about("List the configured chains"))
		.subcommand(Command::new("health").about("Test the connection to every configured chain"))
		.subcommand(
			Command::new("serve").about("Start the HTTP API").arg(
				Arg::new("address")
					.long("address")
					.help("Address to listen on (default: 127.0.0.1:8080)")
					.value_name("HOST:PORT"),
			),
		)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

async fn run(matches: ArgMatches, manager: Arc<BlockchainManager>) -> anyhow::Result<()> {
	match matches.subcommand() {
		Some(("monitor", args)) => {
			let chain = args
				.get_one::<String>("chain")
				.ok_or_else(|| anyhow::anyhow!("--chain is required"))?;
			let address = args
				.get_one::<String>("address")
				.ok_or_else(|| anyhow::anyhow!("--address is required"))?;
			let from_block = args.get_one::<u64>("from-block").copied();

			let result = manager.monitor_wallet(chain, address, from_block).await;
			print_json(&result)?;
			if !result.is_success() {
				std::process::exit(1);
			}
			Ok(())
		}
		Some(("chains", _)) => {
			print_json(&serde_json::json!({"chains": manager.get_supported_chains()}))
		}
		Some(("health", _)) => {
			let connections = manager.test_all_connections().await;
			print_json(&serde_json::json!({"connections": connections}))
		}
		Some(("serve", args)) => {
			let address = args
				.get_one::<String>("address")
				.map(String::as_str)
				.unwrap_or(DEFAULT_API_ADDRESS);
			let server = create_api_server(address, manager)?;
			info!("API server started. Press Ctrl+C to shutdown");
			server.await?;
			info!("API server stopped");
			Ok(())
		}
		_ => Err(anyhow::anyhow!("Unknown command")),
	}
}

/// Main entry point for the wallet monitor.
///
/// # Errors
/// Returns an error if the configuration is invalid or the selected command fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let matches = cli().get_matches();

	// Load environment variables from .env file
	dotenv().ok();

	// Global arguments are propagated down to the selected subcommand
	let log_level = matches
		.subcommand()
		.and_then(|(_, args)| args.get_one::<String>("log-level"))
		.or_else(|| matches.get_one::<String>("log-level"))
		.map(String::as_str)
		.unwrap_or(DEFAULT_LOG_LEVEL);
	setup_logging(log_level).unwrap_or_else(|e| {
		eprintln!("Failed to setup logging: {}", e);
	});

	let config = MonitorConfig::from_env().map_err(|e| {
		error!("Failed to load configuration: {}", e);
		anyhow::anyhow!("Failed to load configuration: {}", e)
	})?;
	let manager = Arc::new(BlockchainManager::from_config(&config));
	if manager.get_supported_chains().is_empty() {
		info!("No chain configured. Set at least one of STARKNET_RPC_URL, ETHEREUM_RPC_URL, POLYGON_RPC_URL or SOLANA_RPC_URL");
	}

	run(matches, manager).await
}
