//! In-memory preference backend implementation.
//!
//! Stores preferences in a map, providing fast access but no persistence
//! across restarts. Primarily for testing and development.

use crate::{PreferenceInterface, StorageError, StorageFactory, StorageRegistry};
use async_trait::async_trait;
use cabinet_types::ImplementationRegistry;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory preference backend.
pub struct MemoryPreferences {
	/// The in-memory store protected by a read-write lock.
	store: RwLock<HashMap<String, String>>,
}

impl MemoryPreferences {
	/// Creates a new MemoryPreferences instance.
	pub fn new() -> Self {
		Self {
			store: RwLock::new(HashMap::new()),
		}
	}
}

impl Default for MemoryPreferences {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl PreferenceInterface for MemoryPreferences {
	async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		let store = self.store.read().await;
		Ok(store.get(key).cloned())
	}

	async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.insert(key.to_string(), value.to_string());
		Ok(())
	}
}

/// Factory function to create a memory preference backend.
///
/// Configuration parameters: none.
pub fn create_storage(_config: &toml::Value) -> Result<Box<dyn PreferenceInterface>, StorageError> {
	Ok(Box::new(MemoryPreferences::new()))
}

/// Registry for the memory preference backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}
