//! Solana RPC client implementation for the cabinet dashboard.
//!
//! Submits transactions through a JSON-RPC node with the configured
//! preflight commitment, then polls the signature status until it reaches
//! the target commitment or the wait times out.

use crate::{ProviderError, RpcFactory, RpcInterface, RpcRegistry};
use async_trait::async_trait;
use cabinet_types::{ConfirmOptions, ImplementationRegistry, SimulationOutcome};
use solana_account_decoder::UiAccountData;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::str::FromStr;
use std::time::Duration;

/// Interval between signature-status polls while confirming.
const DEFAULT_CONFIRM_INTERVAL: Duration = Duration::from_secs(2);
/// Upper bound on the confirmation wait; a blockhash expires well within it.
const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(90);

/// RPC client backed by a Solana JSON-RPC node.
pub struct SolanaRpc {
	/// The underlying non-blocking RPC client.
	client: RpcClient,
	/// Mint of the dashboard token, for balance queries.
	token_mint: Pubkey,
	/// Interval between confirmation polls.
	confirm_interval: Duration,
	/// Maximum time to wait for a confirmation.
	confirm_timeout: Duration,
}

impl SolanaRpc {
	/// Creates a client against the given RPC endpoint.
	pub fn new(url: String, token_mint: Pubkey) -> Self {
		Self {
			client: RpcClient::new(url),
			token_mint,
			confirm_interval: DEFAULT_CONFIRM_INTERVAL,
			confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
		}
	}

	/// Overrides the confirmation poll interval and timeout.
	pub fn with_confirm_timing(mut self, interval: Duration, timeout: Duration) -> Self {
		self.confirm_interval = interval;
		self.confirm_timeout = timeout;
		self
	}
}

/// Maps an RPC client error onto the provider taxonomy.
///
/// Errors carrying a transaction error are on-chain rejections; everything
/// else is transport.
fn map_client_error(error: ClientError) -> ProviderError {
	match error.get_transaction_error() {
		Some(transaction_error) => ProviderError::TransactionFailed(transaction_error.to_string()),
		None => ProviderError::Network(error.to_string()),
	}
}

#[async_trait]
impl RpcInterface for SolanaRpc {
	async fn send_and_confirm(
		&self,
		transaction: &Transaction,
		options: &ConfirmOptions,
	) -> Result<Signature, ProviderError> {
		let config = RpcSendTransactionConfig {
			preflight_commitment: Some(options.preflight_commitment.commitment),
			..RpcSendTransactionConfig::default()
		};

		let signature = self
			.client
			.send_transaction_with_config(transaction, config)
			.await
			.map_err(map_client_error)?;
		tracing::debug!(signature = %signature, "Submitted transaction");

		// Poll until the signature reaches the target commitment
		let started = tokio::time::Instant::now();
		loop {
			if started.elapsed() > self.confirm_timeout {
				return Err(ProviderError::Network(format!(
					"timed out waiting for confirmation of {}",
					signature
				)));
			}

			match self
				.client
				.get_signature_status_with_commitment(&signature, options.commitment)
				.await
			{
				Ok(Some(Ok(()))) => {
					tracing::debug!(signature = %signature, "Confirmed");
					return Ok(signature);
				}
				Ok(Some(Err(transaction_error))) => {
					return Err(ProviderError::TransactionFailed(
						transaction_error.to_string(),
					));
				}
				Ok(None) => {
					// Not yet visible at this commitment
				}
				Err(error) => return Err(map_client_error(error)),
			}

			tokio::time::sleep(self.confirm_interval).await;
		}
	}

	async fn simulate(&self, transaction: &Transaction) -> Result<SimulationOutcome, ProviderError> {
		let response = self
			.client
			.simulate_transaction(transaction)
			.await
			.map_err(map_client_error)?;
		let result = response.value;

		Ok(SimulationOutcome {
			err: result.err.map(|e| e.to_string()),
			logs: result.logs.unwrap_or_default(),
			units_consumed: result.units_consumed,
		})
	}

	async fn confirm(
		&self,
		signature: &Signature,
		commitment: CommitmentConfig,
	) -> Result<bool, ProviderError> {
		let response = self
			.client
			.confirm_transaction_with_commitment(signature, commitment)
			.await
			.map_err(map_client_error)?;
		Ok(response.value)
	}

	async fn latest_blockhash(&self, commitment: CommitmentConfig) -> Result<Hash, ProviderError> {
		let (blockhash, _last_valid_block_height) = self
			.client
			.get_latest_blockhash_with_commitment(commitment)
			.await
			.map_err(map_client_error)?;
		Ok(blockhash)
	}

	async fn token_balance(&self, owner: &Pubkey) -> Result<f64, ProviderError> {
		let accounts = self
			.client
			.get_token_accounts_by_owner(owner, TokenAccountsFilter::Mint(self.token_mint))
			.await
			.map_err(map_client_error)?;

		// Sum the jsonParsed uiAmount over the owner's accounts for the mint
		let mut balance = 0f64;
		for keyed in accounts {
			if let UiAccountData::Json(parsed) = keyed.account.data {
				if let Some(amount) = parsed
					.parsed
					.get("info")
					.and_then(|info| info.get("tokenAmount"))
					.and_then(|token_amount| token_amount.get("uiAmount"))
					.and_then(|ui_amount| ui_amount.as_f64())
				{
					balance += amount;
				}
			}
		}

		Ok(balance)
	}
}

/// Factory function to create a Solana RPC client from configuration.
///
/// Configuration parameters:
/// - `url` (required): HTTP endpoint of the JSON-RPC node
/// - `token_mint` (required): mint address of the dashboard token
/// - `confirm_interval_secs` (optional): seconds between confirmation polls
/// - `confirm_timeout_secs` (optional): maximum confirmation wait in seconds
pub fn create_rpc(config: &toml::Value) -> Result<Box<dyn RpcInterface>, ProviderError> {
	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| ProviderError::Configuration("url is required".to_string()))?;

	let token_mint = config
		.get("token_mint")
		.and_then(|v| v.as_str())
		.ok_or_else(|| ProviderError::Configuration("token_mint is required".to_string()))?;
	let token_mint = Pubkey::from_str(token_mint)
		.map_err(|e| ProviderError::Configuration(format!("invalid token_mint: {}", e)))?;

	let mut rpc = SolanaRpc::new(url.to_string(), token_mint);

	let interval = config
		.get("confirm_interval_secs")
		.and_then(|v| v.as_integer())
		.map(|v| Duration::from_secs(v as u64))
		.unwrap_or(DEFAULT_CONFIRM_INTERVAL);
	let timeout = config
		.get("confirm_timeout_secs")
		.and_then(|v| v.as_integer())
		.map(|v| Duration::from_secs(v as u64))
		.unwrap_or(DEFAULT_CONFIRM_TIMEOUT);
	rpc = rpc.with_confirm_timing(interval, timeout);

	Ok(Box::new(rpc))
}

/// Registry for the Solana RPC implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "solana";
	type Factory = RpcFactory;

	fn factory() -> Self::Factory {
		create_rpc
	}
}

impl RpcRegistry for Registry {}
