//! Configuration loader for modular configuration files.
//!
//! Loads a main TOML file plus any files named in its `include` directive,
//! rejecting duplicate top-level sections and circular includes.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Loader that handles multi-file configurations with includes.
pub(crate) struct ConfigLoader {
	/// Base path for resolving relative includes.
	base_path: PathBuf,
	/// Files loaded so far, to detect circular includes.
	loaded_files: HashSet<PathBuf>,
	/// Top-level sections seen so far, to reject duplicates.
	seen_sections: HashSet<String>,
}

impl ConfigLoader {
	/// Creates a loader resolving relative paths against `base_path`.
	pub(crate) fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			loaded_files: HashSet::new(),
			seen_sections: HashSet::new(),
		}
	}

	/// Loads a configuration file and all of its includes.
	pub(crate) async fn load(&mut self, path: impl AsRef<Path>) -> Result<Config, ConfigError> {
		let path = self.resolve_path(path)?;
		let mut combined = self.load_toml(&path).await?;

		let includes = extract_includes(&combined)?;
		if let Some(table) = combined.as_table_mut() {
			table.remove("include");
		}
		self.note_sections(&combined, &path)?;

		for include in includes {
			let include_path = self.resolve_path(&include)?;
			let fragment = self.load_toml(&include_path).await?;
			self.note_sections(&fragment, &include_path)?;

			if let (Some(target), Some(source)) = (combined.as_table_mut(), fragment.as_table()) {
				for (key, value) in source {
					target.insert(key.clone(), value.clone());
				}
			}
		}

		let config: Config = combined
			.try_into()
			.map_err(|e: toml::de::Error| ConfigError::Parse(e.message().to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Reads one file, resolving env vars and rejecting re-loads.
	async fn load_toml(&mut self, path: &Path) -> Result<toml::Value, ConfigError> {
		let canonical = path.canonicalize().map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("cannot resolve path {}: {}", path.display(), e),
			))
		})?;
		if !self.loaded_files.insert(canonical.clone()) {
			return Err(ConfigError::Validation(format!(
				"circular include: {} was already loaded",
				canonical.display()
			)));
		}

		let content = tokio::fs::read_to_string(path).await?;
		let resolved = resolve_env_vars(&content)?;
		Ok(toml::from_str(&resolved)?)
	}

	/// Records a file's top-level sections, rejecting duplicates.
	fn note_sections(&mut self, value: &toml::Value, path: &Path) -> Result<(), ConfigError> {
		if let Some(table) = value.as_table() {
			for key in table.keys() {
				if !self.seen_sections.insert(key.clone()) {
					return Err(ConfigError::Validation(format!(
						"duplicate section '{}' in {}; each top-level section must be unique across included files",
						key,
						path.display()
					)));
				}
			}
		}
		Ok(())
	}

	/// Resolves a path relative to the base path and checks it exists.
	fn resolve_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
		let path = path.as_ref();
		let resolved = if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.base_path.join(path)
		};

		if !resolved.exists() {
			return Err(ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("configuration file not found: {}", resolved.display()),
			)));
		}
		Ok(resolved)
	}
}

/// Extracts the `include` directive, if present.
fn extract_includes(value: &toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	match value.get("include") {
		None => Ok(Vec::new()),
		Some(toml::Value::String(path)) => Ok(vec![PathBuf::from(path)]),
		Some(toml::Value::Array(items)) => items
			.iter()
			.map(|item| {
				item.as_str().map(PathBuf::from).ok_or_else(|| {
					ConfigError::Validation(
						"include array must contain only strings".into(),
					)
				})
			})
			.collect(),
		Some(_) => Err(ConfigError::Validation(
			"include must be a string or array of strings".into(),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const MAIN_SECTIONS: &str = r#"
[dashboard]
id = "cabinet-test"

[provider]
primary = "solana"
[provider.implementations.solana]
url = "http://localhost:8899"
token_mint = "So11111111111111111111111111111111111111112"

[wallet]
primary = "keypair"
[wallet.implementations.keypair]
"#;

	const REST_SECTIONS: &str = r#"
[rewards]
primary = "fixture"
[rewards.implementations.fixture]

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[tokio::test]
	async fn test_single_file_config() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("config.toml");
		fs::write(&config_path, format!("{}{}", MAIN_SECTIONS, REST_SECTIONS)).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let config = loader.load("config.toml").await.unwrap();

		assert_eq!(config.dashboard.id, "cabinet-test");
	}

	#[tokio::test]
	async fn test_config_with_includes() {
		let temp_dir = TempDir::new().unwrap();
		let main = format!("include = [\"rest.toml\"]\n{}", MAIN_SECTIONS);
		fs::write(temp_dir.path().join("main.toml"), main).unwrap();
		fs::write(temp_dir.path().join("rest.toml"), REST_SECTIONS).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let config = loader.load("main.toml").await.unwrap();

		assert_eq!(config.storage.primary, "memory");
	}

	#[tokio::test]
	async fn test_duplicate_section_error() {
		let temp_dir = TempDir::new().unwrap();
		let main = format!("include = [\"rest.toml\"]\n{}{}", MAIN_SECTIONS, REST_SECTIONS);
		fs::write(temp_dir.path().join("main.toml"), main).unwrap();
		fs::write(temp_dir.path().join("rest.toml"), REST_SECTIONS).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let result = loader.load("main.toml").await;

		assert!(result
			.unwrap_err()
			.to_string()
			.contains("duplicate section"));
	}

	#[tokio::test]
	async fn test_self_include_detection() {
		let temp_dir = TempDir::new().unwrap();
		let main = format!("include = [\"main.toml\"]\n{}{}", MAIN_SECTIONS, REST_SECTIONS);
		fs::write(temp_dir.path().join("main.toml"), main).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let result = loader.load("main.toml").await;

		assert!(result.unwrap_err().to_string().contains("already loaded"));
	}
}
