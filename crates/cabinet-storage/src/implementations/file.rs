//! File-based preference backend implementation.
//!
//! Persists preferences as a single JSON object on disk. Writes go through
//! a temp file and an atomic rename so a crash never leaves a truncated
//! preference file behind.

use crate::{PreferenceInterface, StorageError, StorageFactory, StorageRegistry};
use async_trait::async_trait;
use cabinet_types::ImplementationRegistry;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// File-backed preference backend.
pub struct FilePreferences {
	/// Path of the JSON preference file.
	path: PathBuf,
	/// Serializes read-modify-write cycles.
	write_lock: Mutex<()>,
}

impl FilePreferences {
	/// Creates a backend persisting to the given file path.
	pub fn new(path: PathBuf) -> Self {
		Self {
			path,
			write_lock: Mutex::new(()),
		}
	}

	async fn read_map(&self) -> Result<HashMap<String, String>, StorageError> {
		match fs::read(&self.path).await {
			Ok(bytes) => serde_json::from_slice(&bytes)
				.map_err(|e| StorageError::Serialization(e.to_string())),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StorageError> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		let bytes = serde_json::to_vec_pretty(map)
			.map_err(|e| StorageError::Serialization(e.to_string()))?;

		// Write atomically by writing to a temp file then renaming
		let temp_path = self.path.with_extension("tmp");
		fs::write(&temp_path, bytes)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &self.path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}
}

#[async_trait]
impl PreferenceInterface for FilePreferences {
	async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		let map = self.read_map().await?;
		Ok(map.get(key).cloned())
	}

	async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		let _guard = self.write_lock.lock().await;
		let mut map = self.read_map().await?;
		map.insert(key.to_string(), value.to_string());
		self.write_map(&map).await
	}
}

/// Factory function to create a file preference backend from configuration.
///
/// Configuration parameters:
/// - `path`: preference file location (default: "./data/preferences.json")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn PreferenceInterface>, StorageError> {
	let path = config
		.get("path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/preferences.json")
		.to_string();

	Ok(Box::new(FilePreferences::new(PathBuf::from(path))))
}

/// Registry for the file preference backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_roundtrip_survives_reopen() {
		let temp_dir = TempDir::new().unwrap();
		let path = temp_dir.path().join("preferences.json");

		let storage = FilePreferences::new(path.clone());
		storage.set("character", "green").await.unwrap();

		let reopened = FilePreferences::new(path);
		assert_eq!(
			reopened.get("character").await.unwrap(),
			Some("green".to_string())
		);
	}

	#[tokio::test]
	async fn test_missing_file_reads_as_empty() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FilePreferences::new(temp_dir.path().join("preferences.json"));

		assert_eq!(storage.get("character").await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_set_overwrites_without_clobbering_other_keys() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FilePreferences::new(temp_dir.path().join("preferences.json"));

		storage.set("character", "green").await.unwrap();
		storage.set("volume", "low").await.unwrap();
		storage.set("character", "default").await.unwrap();

		assert_eq!(
			storage.get("character").await.unwrap(),
			Some("default".to_string())
		);
		assert_eq!(
			storage.get("volume").await.unwrap(),
			Some("low".to_string())
		);
	}
}
