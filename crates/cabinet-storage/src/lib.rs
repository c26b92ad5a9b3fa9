//! Preference storage module for the cabinet dashboard.
//!
//! This module provides abstractions for the small key-value store the
//! dashboard keeps its local preferences in — currently a single scoped
//! slot holding the equipped-character identifier.

use async_trait::async_trait;
use cabinet_types::ImplementationRegistry;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during preference storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs in the storage backend.
	#[error("backend error: {0}")]
	Backend(String),
	/// Error that occurs during serialization/deserialization.
	#[error("serialization error: {0}")]
	Serialization(String),
	/// Error that occurs when the backend configuration is invalid.
	#[error("configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for preference backends.
#[async_trait]
pub trait PreferenceInterface: Send + Sync {
	/// Retrieves the value stored under `key`, if any.
	async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

	/// Stores `value` under `key`, overwriting any previous value.
	async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Type alias for preference backend factory functions.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn PreferenceInterface>, StorageError>;

/// Registry trait for preference backend implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered preference backend implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level preference store over a pluggable backend.
pub struct PreferenceStore {
	/// The underlying backend implementation.
	backend: Box<dyn PreferenceInterface>,
}

impl PreferenceStore {
	/// Creates a new PreferenceStore with the specified backend.
	pub fn new(backend: Box<dyn PreferenceInterface>) -> Self {
		Self { backend }
	}

	/// Retrieves the value stored under `key`, if any.
	pub async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		self.backend.get(key).await
	}

	/// Retrieves the value stored under `key`, falling back to `default`
	/// when the slot is empty.
	pub async fn get_or(&self, key: &str, default: &str) -> Result<String, StorageError> {
		Ok(self
			.backend
			.get(key)
			.await?
			.unwrap_or_else(|| default.to_string()))
	}

	/// Stores `value` under `key`.
	pub async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.backend.set(key, value).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::implementations::memory::MemoryPreferences;

	#[tokio::test]
	async fn test_get_or_falls_back_when_absent() {
		let store = PreferenceStore::new(Box::new(MemoryPreferences::new()));

		assert_eq!(store.get("character").await.unwrap(), None);
		assert_eq!(
			store.get_or("character", "default").await.unwrap(),
			"default"
		);

		store.set("character", "green").await.unwrap();
		assert_eq!(
			store.get_or("character", "default").await.unwrap(),
			"green"
		);
	}
}
