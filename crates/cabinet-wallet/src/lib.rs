//! Wallet management module for the cabinet dashboard.
//!
//! This module provides abstractions for the wallet signer: the component
//! that holds the user's key material and signs transaction payloads on
//! request. The connection flow itself lives outside the core; it drives
//! the session's availability state through a narrow seam.

use async_trait::async_trait;
use cabinet_types::{ImplementationRegistry, WalletAvailability};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Re-export implementations
pub mod implementations {
	pub mod keypair;
}

/// Errors that can occur during wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
	/// No wallet is available for signing.
	#[error("wallet unavailable")]
	Unavailable,
	/// The wallet refused to sign.
	#[error("signing rejected: {0}")]
	Rejected(String),
	/// The wallet failed to produce a signature.
	#[error("signing failed: {0}")]
	Signing(String),
	/// Key material could not be loaded or is malformed.
	#[error("invalid key: {0}")]
	InvalidKey(String),
}

/// Trait defining the interface for wallet signer implementations.
///
/// Implementations expose the active public key and sign transaction
/// payloads; both may fail when the underlying key material is unavailable
/// or the user declines.
#[async_trait]
pub trait WalletInterface: Send + Sync {
	/// The public key the wallet signs under.
	fn public_key(&self) -> Result<Pubkey, WalletError>;

	/// Signs the transaction against its recent blockhash.
	///
	/// Returns the signed transaction, or an error when the wallet cannot
	/// or will not sign.
	async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, WalletError>;
}

/// Type alias for wallet factory functions.
pub type WalletFactory = fn(&toml::Value) -> Result<Box<dyn WalletInterface>, WalletError>;

/// Registry trait for wallet implementations.
pub trait WalletRegistry: ImplementationRegistry<Factory = WalletFactory> {}

/// Get all registered wallet implementations.
pub fn get_all_implementations() -> Vec<(&'static str, WalletFactory)> {
	use implementations::keypair;

	vec![(keypair::Registry::NAME, keypair::Registry::factory())]
}

/// One wallet session: a signer implementation plus its availability state.
///
/// The session broadcasts availability transitions over a watch channel;
/// the snapshot monitor subscribes to it, and the external connection flow
/// flips the state through [`connect`](Self::connect) and
/// [`disconnect`](Self::disconnect).
pub struct WalletSession {
	/// The underlying signer implementation.
	implementation: Arc<dyn WalletInterface>,
	/// Current availability, observable by any number of subscribers.
	availability: watch::Sender<WalletAvailability>,
}

impl WalletSession {
	/// Creates a session over the given signer, initially disconnected.
	pub fn new(implementation: Arc<dyn WalletInterface>) -> Self {
		let (availability, _) = watch::channel(WalletAvailability::Disconnected);
		Self {
			implementation,
			availability,
		}
	}

	/// Marks the wallet available and returns its public key.
	pub fn connect(&self) -> Result<Pubkey, WalletError> {
		let public_key = self.implementation.public_key()?;
		self.availability
			.send_replace(WalletAvailability::Connected(public_key));
		Ok(public_key)
	}

	/// Marks the wallet unavailable.
	pub fn disconnect(&self) {
		self.availability
			.send_replace(WalletAvailability::Disconnected);
	}

	/// Current availability state.
	pub fn availability(&self) -> WalletAvailability {
		*self.availability.borrow()
	}

	/// Subscribes to availability transitions.
	pub fn subscribe(&self) -> watch::Receiver<WalletAvailability> {
		self.availability.subscribe()
	}

	/// The active public key.
	///
	/// Fails with [`WalletError::Unavailable`] while disconnected.
	pub fn public_key(&self) -> Result<Pubkey, WalletError> {
		self.availability()
			.public_key()
			.ok_or(WalletError::Unavailable)
	}

	/// Signs a transaction through the underlying implementation.
	///
	/// Fails with [`WalletError::Unavailable`] while disconnected, without
	/// touching the implementation.
	pub async fn sign(&self, transaction: Transaction) -> Result<Transaction, WalletError> {
		if !self.availability().is_connected() {
			return Err(WalletError::Unavailable);
		}
		self.implementation.sign_transaction(transaction).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::implementations::keypair::KeypairWallet;
	use solana_sdk::signature::Keypair;

	#[tokio::test]
	async fn test_session_starts_disconnected() {
		let session = WalletSession::new(Arc::new(KeypairWallet::new(Keypair::new())));

		assert!(!session.availability().is_connected());
		assert!(matches!(
			session.public_key(),
			Err(WalletError::Unavailable)
		));
	}

	#[tokio::test]
	async fn test_connect_broadcasts_transition() {
		let session = WalletSession::new(Arc::new(KeypairWallet::new(Keypair::new())));
		let mut receiver = session.subscribe();

		let public_key = session.connect().unwrap();
		receiver.changed().await.unwrap();
		assert_eq!(
			*receiver.borrow(),
			WalletAvailability::Connected(public_key)
		);

		session.disconnect();
		receiver.changed().await.unwrap();
		assert_eq!(*receiver.borrow(), WalletAvailability::Disconnected);
	}

	#[tokio::test]
	async fn test_sign_requires_connection() {
		let session = WalletSession::new(Arc::new(KeypairWallet::new(Keypair::new())));
		let transaction = Transaction::default();

		let result = session.sign(transaction).await;
		assert!(matches!(result, Err(WalletError::Unavailable)));
	}
}
