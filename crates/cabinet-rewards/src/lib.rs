//! Reward data module for the cabinet dashboard.
//!
//! This module abstracts the source of reward-item data: given a public
//! key, a source returns the items that wallet earned and purchased. The
//! snapshot monitor consumes it on every wallet-availability transition.

use async_trait::async_trait;
use cabinet_types::{ImplementationRegistry, RewardCollection};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod fixture;
	pub mod http;
}

/// Errors that can occur while fetching reward data.
#[derive(Debug, Error)]
pub enum RewardsError {
	/// Error that occurs during network communication.
	#[error("network error: {0}")]
	Network(String),
	/// Error that occurs when decoding the reward payload.
	#[error("decode error: {0}")]
	Decode(String),
	/// Error that occurs when the source configuration is invalid.
	#[error("configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for reward data sources.
#[async_trait]
pub trait RewardSource: Send + Sync {
	/// Fetches the reward collection scoped to one public key.
	async fn fetch(&self, owner: &Pubkey) -> Result<RewardCollection, RewardsError>;
}

/// Type alias for reward source factory functions.
pub type RewardsFactory = fn(&toml::Value) -> Result<Box<dyn RewardSource>, RewardsError>;

/// Registry trait for reward source implementations.
pub trait RewardsRegistry: ImplementationRegistry<Factory = RewardsFactory> {}

/// Get all registered reward source implementations.
pub fn get_all_implementations() -> Vec<(&'static str, RewardsFactory)> {
	use implementations::{fixture, http};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(fixture::Registry::NAME, fixture::Registry::factory()),
	]
}

/// Service that manages reward data retrieval.
pub struct RewardsService {
	/// The underlying source implementation.
	source: Box<dyn RewardSource>,
}

impl RewardsService {
	/// Creates a new RewardsService with the specified source.
	pub fn new(source: Box<dyn RewardSource>) -> Self {
		Self { source }
	}

	/// Fetches the reward collection for one public key.
	pub async fn fetch(&self, owner: &Pubkey) -> Result<RewardCollection, RewardsError> {
		self.source.fetch(owner).await
	}
}
