//! Reward items and the balance/reward snapshot.
//!
//! The snapshot is owned exclusively by the state layer and replaced
//! wholesale on each successful fetch; nothing mutates it field by field.
//! Wire names follow the reward service's JSON shape.

use serde::{Deserialize, Serialize};

/// One display attribute attached to a reward item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAttribute {
	/// Attribute kind, e.g. `character`.
	pub trait_type: String,
	/// Attribute value, e.g. `yes`.
	pub value: String,
}

/// A cosmetic reward item granted to or purchased by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardItem {
	/// Display title, also the selection key for character items.
	pub title: String,
	/// Collection category the item belongs to.
	pub category: String,
	/// Artwork location.
	#[serde(rename = "img")]
	pub image: String,
	/// Descriptive flavor text.
	pub content: String,
	/// Display attributes; `character = yes` marks an equippable item.
	#[serde(default)]
	pub attributes: Vec<ItemAttribute>,
}

impl RewardItem {
	/// Whether this item can be equipped as a playable character.
	pub fn is_character(&self) -> bool {
		self.attributes
			.iter()
			.any(|attribute| attribute.trait_type == "character" && attribute.value == "yes")
	}
}

/// Reward items scoped to one public key, as returned by the reward source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCollection {
	/// Items earned through play.
	#[serde(rename = "rewardedNfts")]
	pub rewarded: Vec<RewardItem>,
	/// Items bought in the store.
	#[serde(rename = "purchases")]
	pub purchased: Vec<RewardItem>,
}

/// The dashboard's view of one wallet's balance and reward items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CabinetSnapshot {
	/// Balance of the dashboard token, in display units.
	pub token_balance: f64,
	/// Items earned through play.
	pub rewarded_items: Vec<RewardItem>,
	/// Items bought in the store.
	pub purchased_items: Vec<RewardItem>,
	/// Whether a refresh is in flight.
	pub loading: bool,
}
