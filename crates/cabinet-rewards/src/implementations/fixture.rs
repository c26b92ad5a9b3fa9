//! Fixture reward source implementation.
//!
//! Serves a fixed collection, either built in or loaded from a JSON file.
//! Useful for development and for running the dashboard against no backend.

use crate::{RewardsError, RewardsFactory, RewardsRegistry, RewardSource};
use async_trait::async_trait;
use cabinet_types::{ImplementationRegistry, ItemAttribute, RewardCollection, RewardItem};
use solana_sdk::pubkey::Pubkey;

/// Reward source serving a fixed collection to every owner.
pub struct FixtureRewards {
	collection: RewardCollection,
}

impl FixtureRewards {
	/// Creates a source over the given collection.
	pub fn new(collection: RewardCollection) -> Self {
		Self { collection }
	}

	/// The built-in development collection.
	pub fn default_collection() -> RewardCollection {
		RewardCollection {
			rewarded: vec![RewardItem {
				title: "Castle Crest".to_string(),
				category: "trophies".to_string(),
				image: "castle-crest.png".to_string(),
				content: "Awarded for clearing the castle questline".to_string(),
				attributes: Vec::new(),
			}],
			purchased: vec![RewardItem {
				title: "Green Warrior".to_string(),
				category: "characters".to_string(),
				image: "green-warrior.png".to_string(),
				content: "A playable warrior clad in green".to_string(),
				attributes: vec![ItemAttribute {
					trait_type: "character".to_string(),
					value: "yes".to_string(),
				}],
			}],
		}
	}
}

impl Default for FixtureRewards {
	fn default() -> Self {
		Self::new(Self::default_collection())
	}
}

#[async_trait]
impl RewardSource for FixtureRewards {
	async fn fetch(&self, _owner: &Pubkey) -> Result<RewardCollection, RewardsError> {
		Ok(self.collection.clone())
	}
}

/// Factory function to create a fixture reward source from configuration.
///
/// Configuration parameters:
/// - `path` (optional): JSON file holding a reward collection. When absent,
///   the built-in development collection is served.
pub fn create_source(config: &toml::Value) -> Result<Box<dyn RewardSource>, RewardsError> {
	let source = match config.get("path").and_then(|v| v.as_str()) {
		Some(path) => {
			let raw = std::fs::read_to_string(path)
				.map_err(|e| RewardsError::Configuration(format!("cannot read {}: {}", path, e)))?;
			let collection = serde_json::from_str(&raw)
				.map_err(|e| RewardsError::Decode(e.to_string()))?;
			FixtureRewards::new(collection)
		}
		None => FixtureRewards::default(),
	};
	Ok(Box::new(source))
}

/// Registry for the fixture reward source implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "fixture";
	type Factory = RewardsFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl RewardsRegistry for Registry {}
