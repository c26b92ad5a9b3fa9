//! Transaction provider module for the cabinet dashboard.
//!
//! This module wraps an RPC client and a wallet signer behind one
//! operational contract — build, sign, send, confirm — and splices a
//! notification side channel into the send path. Callers issue
//! transactions exactly as they would against the unwrapped client; the
//! sink learns about every outcome without the caller's involvement.

use async_trait::async_trait;
use cabinet_types::{
	ConfirmOptions, ImplementationRegistry, NotificationEvent, NotificationSink,
	SimulationOutcome, TransactionRequest,
};
use cabinet_wallet::{WalletError, WalletSession};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod solana;
}

/// Errors that can occur on the provider's operational paths.
#[derive(Debug, Error)]
pub enum ProviderError {
	/// The wallet refused or was unable to produce a signature.
	#[error("signing error: {0}")]
	Signing(String),
	/// The RPC endpoint was unreachable or the request timed out.
	#[error("network error: {0}")]
	Network(String),
	/// The transaction was processed and rejected by the program.
	#[error("transaction failed: {0}")]
	TransactionFailed(String),
	/// The implementation configuration is invalid.
	#[error("configuration error: {0}")]
	Configuration(String),
}

impl From<WalletError> for ProviderError {
	fn from(err: WalletError) -> Self {
		Self::Signing(err.to_string())
	}
}

/// Trait defining the interface for RPC client implementations.
///
/// This is the complete capability set the dashboard consumes from a
/// blockchain node. The notifying provider instruments only
/// [`send_and_confirm`](Self::send_and_confirm); every other capability is
/// forwarded untouched.
#[async_trait]
pub trait RpcInterface: Send + Sync {
	/// Submits a signed transaction and waits until it reaches the
	/// commitment fixed in `options`.
	async fn send_and_confirm(
		&self,
		transaction: &Transaction,
		options: &ConfirmOptions,
	) -> Result<Signature, ProviderError>;

	/// Dry-runs a transaction without submitting it.
	async fn simulate(&self, transaction: &Transaction) -> Result<SimulationOutcome, ProviderError>;

	/// Whether the given signature has reached the given commitment.
	async fn confirm(
		&self,
		signature: &Signature,
		commitment: CommitmentConfig,
	) -> Result<bool, ProviderError>;

	/// A recent blockhash at the given commitment.
	async fn latest_blockhash(&self, commitment: CommitmentConfig) -> Result<Hash, ProviderError>;

	/// Balance of the dashboard token held by `owner`, in display units.
	async fn token_balance(&self, owner: &Pubkey) -> Result<f64, ProviderError>;
}

/// Type alias for RPC client factory functions.
pub type RpcFactory = fn(&toml::Value) -> Result<Box<dyn RpcInterface>, ProviderError>;

/// Registry trait for RPC client implementations.
pub trait RpcRegistry: ImplementationRegistry<Factory = RpcFactory> {}

/// Get all registered RPC client implementations.
pub fn get_all_implementations() -> Vec<(&'static str, RpcFactory)> {
	use implementations::solana;

	vec![(solana::Registry::NAME, solana::Registry::factory())]
}

/// Provider that intercepts the send path to emit notification events.
///
/// Construction pins the connection, the wallet session, the confirmation
/// options and the sink for the lifetime of the instance; no network I/O
/// happens until a call arrives. The provider holds no per-call state, so
/// concurrent sends are independent and unordered.
pub struct NotifyingProvider {
	/// The wrapped RPC client. Never mutated by the provider.
	connection: Arc<dyn RpcInterface>,
	/// The wallet that signs every outgoing transaction.
	wallet: Arc<WalletSession>,
	/// Commitment levels applied to every send.
	options: ConfirmOptions,
	/// Observer of every send outcome.
	sink: Arc<dyn NotificationSink>,
}

impl NotifyingProvider {
	/// Creates a provider over the given connection and wallet session.
	pub fn new(
		connection: Arc<dyn RpcInterface>,
		wallet: Arc<WalletSession>,
		options: ConfirmOptions,
		sink: Arc<dyn NotificationSink>,
	) -> Self {
		Self {
			connection,
			wallet,
			options,
			sink,
		}
	}

	/// Signs and submits a transaction request, notifying the sink of the
	/// outcome.
	///
	/// The underlying send is invoked exactly once per call; there is no
	/// retry at this layer. On success the call resolves to the signature
	/// the unwrapped client would have returned; on failure it returns the
	/// same error the unwrapped client would have raised. Either way the
	/// sink is invoked exactly once, after the outcome is known, and a sink
	/// failure never alters the result.
	pub async fn send(&self, request: TransactionRequest) -> Result<Signature, ProviderError> {
		let outcome = self.dispatch(request).await;
		self.notify(&outcome);
		outcome
	}

	/// Build, sign and submit — the unwrapped send path.
	async fn dispatch(&self, request: TransactionRequest) -> Result<Signature, ProviderError> {
		// A missing signer is a signing error, not a network error
		let payer = self.wallet.public_key()?;

		let mut transaction = Transaction::new_with_payer(&request.instructions, Some(&payer));
		transaction.message.recent_blockhash = match request.recent_blockhash {
			Some(recent_blockhash) => recent_blockhash,
			None => {
				self.connection
					.latest_blockhash(self.options.preflight_commitment)
					.await?
			}
		};

		// Sign through the wallet session
		let transaction = self.wallet.sign(transaction).await?;

		// Submit exactly once; retries belong to the wrapped client
		self.connection
			.send_and_confirm(&transaction, &self.options)
			.await
	}

	/// Mirrors the outcome to the sink, isolating sink failures.
	fn notify(&self, outcome: &Result<Signature, ProviderError>) {
		let event = match outcome {
			Ok(signature) => NotificationEvent::confirmed(*signature),
			Err(error) => NotificationEvent::failed(error.to_string()),
		};
		if let Err(error) = self.sink.notify(event) {
			tracing::warn!(error = %error, "Notification sink rejected event");
		}
	}

	/// Dry-runs a request without submitting it. Pass-through.
	pub async fn simulate(
		&self,
		request: &TransactionRequest,
	) -> Result<SimulationOutcome, ProviderError> {
		let payer = self.wallet.public_key()?;

		let mut transaction = Transaction::new_with_payer(&request.instructions, Some(&payer));
		transaction.message.recent_blockhash = match request.recent_blockhash {
			Some(recent_blockhash) => recent_blockhash,
			None => {
				self.connection
					.latest_blockhash(self.options.preflight_commitment)
					.await?
			}
		};

		self.connection.simulate(&transaction).await
	}

	/// Whether a signature has reached the pinned commitment. Pass-through.
	pub async fn confirm(&self, signature: &Signature) -> Result<bool, ProviderError> {
		self.connection
			.confirm(signature, self.options.commitment)
			.await
	}

	/// A recent blockhash at the pinned preflight commitment. Pass-through.
	pub async fn latest_blockhash(&self) -> Result<Hash, ProviderError> {
		self.connection
			.latest_blockhash(self.options.preflight_commitment)
			.await
	}

	/// Token balance for `owner`. Pass-through.
	pub async fn token_balance(&self, owner: &Pubkey) -> Result<f64, ProviderError> {
		self.connection.token_balance(owner).await
	}

	/// The wrapped connection, for capabilities added after this wrapper.
	pub fn connection(&self) -> &Arc<dyn RpcInterface> {
		&self.connection
	}

	/// The wallet session this provider signs with.
	pub fn wallet(&self) -> &Arc<WalletSession> {
		&self.wallet
	}

	/// The commitment levels pinned at construction.
	pub fn options(&self) -> ConfirmOptions {
		self.options
	}
}
