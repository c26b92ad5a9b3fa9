//! Wallet availability state.
//!
//! A derived value describing whether a wallet is currently usable for
//! signing. Transitions into `Connected` drive the snapshot monitor.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Whether a wallet is available, and under which public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletAvailability {
	/// No wallet is available for signing.
	Disconnected,
	/// A wallet is available under the given public key.
	Connected(Pubkey),
}

impl WalletAvailability {
	/// The active public key, when connected.
	pub fn public_key(&self) -> Option<Pubkey> {
		match self {
			Self::Connected(public_key) => Some(*public_key),
			Self::Disconnected => None,
		}
	}

	/// Whether a wallet is currently available.
	pub fn is_connected(&self) -> bool {
		matches!(self, Self::Connected(_))
	}
}
