//! HTTP reward source implementation.
//!
//! Fetches the reward collection from a metadata service endpoint keyed by
//! the owner's public key.

use crate::{RewardsError, RewardsFactory, RewardsRegistry, RewardSource};
use async_trait::async_trait;
use cabinet_types::{ImplementationRegistry, RewardCollection};
use solana_sdk::pubkey::Pubkey;

/// Reward source backed by an HTTP metadata service.
pub struct HttpRewards {
	client: reqwest::Client,
	base_url: String,
}

impl HttpRewards {
	/// Creates a source against the given base URL.
	pub fn new(base_url: String) -> Self {
		Self {
			client: reqwest::Client::new(),
			base_url,
		}
	}

	fn collection_url(&self, owner: &Pubkey) -> String {
		format!("{}/cabinet/{}", self.base_url.trim_end_matches('/'), owner)
	}
}

#[async_trait]
impl RewardSource for HttpRewards {
	async fn fetch(&self, owner: &Pubkey) -> Result<RewardCollection, RewardsError> {
		let url = self.collection_url(owner);
		tracing::debug!(url = %url, "Fetching reward collection");

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| RewardsError::Network(e.to_string()))?;

		if !response.status().is_success() {
			return Err(RewardsError::Network(format!(
				"reward service returned {}",
				response.status()
			)));
		}

		response
			.json::<RewardCollection>()
			.await
			.map_err(|e| RewardsError::Decode(e.to_string()))
	}
}

/// Factory function to create an HTTP reward source from configuration.
///
/// Configuration parameters:
/// - `base_url` (required): base URL of the reward metadata service
pub fn create_source(config: &toml::Value) -> Result<Box<dyn RewardSource>, RewardsError> {
	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| RewardsError::Configuration("base_url is required".to_string()))?;

	Ok(Box::new(HttpRewards::new(base_url.to_string())))
}

/// Registry for the HTTP reward source implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = RewardsFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl RewardsRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_collection_url_joins_cleanly() {
		let owner = Pubkey::new_unique();
		let source = HttpRewards::new("https://rewards.example/".to_string());
		assert_eq!(
			source.collection_url(&owner),
			format!("https://rewards.example/cabinet/{}", owner)
		);
	}

	#[test]
	fn test_factory_requires_base_url() {
		let config = toml::Value::Table(Default::default());
		assert!(matches!(
			create_source(&config),
			Err(RewardsError::Configuration(_))
		));
	}
}
