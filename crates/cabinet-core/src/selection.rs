//! Character selection for reward items.
//!
//! A pure mapping from a reward item's display title to a local "equipped"
//! asset identifier, persisted in a single preference slot. Toggling the
//! same item reverts to the default identifier; unmapped titles are
//! no-ops. Nothing here talks to a server.

use cabinet_storage::{PreferenceStore, StorageError};
use cabinet_types::RewardItem;
use std::collections::HashMap;
use std::sync::Arc;

/// Identifier equipped when no item is selected.
pub const DEFAULT_CHARACTER: &str = "default";

/// Maps reward titles to equipable asset identifiers and persists the
/// active selection.
pub struct CharacterSelector {
	/// Preference store holding the equipped identifier.
	store: Arc<PreferenceStore>,
	/// Preference slot the selection lives in.
	slot: String,
	/// Title-to-asset mapping; only mapped titles are selectable.
	title_map: HashMap<String, String>,
}

impl CharacterSelector {
	/// Creates a selector over the given store and mapping.
	pub fn new(store: Arc<PreferenceStore>, slot: String, title_map: HashMap<String, String>) -> Self {
		Self {
			store,
			slot,
			title_map,
		}
	}

	/// The currently equipped identifier, `"default"` when none was ever
	/// selected.
	pub async fn current(&self) -> Result<String, StorageError> {
		self.store.get_or(&self.slot, DEFAULT_CHARACTER).await
	}

	/// Whether selecting this item would have any effect.
	pub fn selectable(&self, item: &RewardItem) -> bool {
		item.is_character() && self.title_map.contains_key(&item.title)
	}

	/// Toggles the selection for the item with the given title.
	///
	/// Selecting a mapped title equips its identifier; selecting it again
	/// reverts to [`DEFAULT_CHARACTER`]. Returns the identifier now
	/// equipped, or `None` when the title is unmapped and nothing changed.
	pub async fn toggle(&self, title: &str) -> Result<Option<String>, StorageError> {
		let Some(asset) = self.title_map.get(title) else {
			return Ok(None);
		};

		let current = self.current().await?;
		let next = if current == *asset {
			DEFAULT_CHARACTER.to_string()
		} else {
			asset.clone()
		};

		self.store.set(&self.slot, &next).await?;
		Ok(Some(next))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use cabinet_storage::implementations::memory::MemoryPreferences;

	fn selector() -> CharacterSelector {
		let store = Arc::new(PreferenceStore::new(Box::new(MemoryPreferences::new())));
		let title_map =
			HashMap::from([("Green Warrior".to_string(), "green".to_string())]);
		CharacterSelector::new(store, "character".to_string(), title_map)
	}

	#[tokio::test]
	async fn test_toggle_equips_then_reverts() {
		let selector = selector();
		assert_eq!(selector.current().await.unwrap(), "default");

		let equipped = selector.toggle("Green Warrior").await.unwrap();
		assert_eq!(equipped.as_deref(), Some("green"));
		assert_eq!(selector.current().await.unwrap(), "green");

		let equipped = selector.toggle("Green Warrior").await.unwrap();
		assert_eq!(equipped.as_deref(), Some("default"));
		assert_eq!(selector.current().await.unwrap(), "default");
	}

	#[tokio::test]
	async fn test_unmapped_title_is_a_no_op() {
		let selector = selector();
		selector.toggle("Green Warrior").await.unwrap();

		let result = selector.toggle("Crimson Rogue").await.unwrap();
		assert_eq!(result, None);
		// prior selection untouched
		assert_eq!(selector.current().await.unwrap(), "green");
	}

	#[tokio::test]
	async fn test_selectable_requires_map_entry_and_character_attribute() {
		use cabinet_types::{ItemAttribute, RewardItem};

		let selector = selector();
		let mut item = RewardItem {
			title: "Green Warrior".to_string(),
			category: "characters".to_string(),
			image: "green-warrior.png".to_string(),
			content: String::new(),
			attributes: vec![ItemAttribute {
				trait_type: "character".to_string(),
				value: "yes".to_string(),
			}],
		};
		assert!(selector.selectable(&item));

		item.title = "Crimson Rogue".to_string();
		assert!(!selector.selectable(&item));

		item.title = "Green Warrior".to_string();
		item.attributes.clear();
		assert!(!selector.selectable(&item));
	}
}
