//! Chain provider interfaces and implementations.
//!
//! Provides the abstraction used to scan wallets on heterogeneous blockchains.
//! Includes:
//!
//! - Chain provider trait and shared scan plumbing
//! - Starknet, EVM and Solana providers
//! - JSON-RPC transport with endpoint rotation
//! - Error handling for provider operations
//! - Blockchain manager dispatching requests to providers

mod error;
mod manager;
mod provider;
mod providers;
mod transports;

pub use error::ProviderError;
pub use manager::{create_provider, BlockchainManager};
pub use provider::{
	now_timestamp, resolve_block_window, run_scan, ChainProvider, WalletScan, SCAN_FAILED_ERROR,
	SCAN_TIMEOUT_ERROR,
};
pub use providers::{
	evm_helpers, solana_helpers, starknet_helpers, EvmProvider, SolanaProvider, StarknetProvider,
};
pub use transports::{
	BlockchainTransport, EndpointManager, HttpTransportClient, RotatingTransport, TransportError,
};
