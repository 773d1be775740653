//! Blockchain family definitions.
//!
//! Every configured network belongs to exactly one family; the family decides
//! which provider implementation handles it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported blockchain families
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
	/// Starknet (Cairo) chains
	Starknet,
	/// Ethereum Virtual Machine based chains
	Evm,
	/// Solana chains
	Solana,
}

impl fmt::Display for ChainType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Starknet => write!(f, "starknet"),
			Self::Evm => write!(f, "evm"),
			Self::Solana => write!(f, "solana"),
		}
	}
}
