//! Configuration module for the cabinet dashboard.
//!
//! This module provides structures and utilities for managing dashboard
//! configuration. It supports loading configuration from TOML files,
//! resolving `${ENV_VAR}` references, and splitting configuration across
//! multiple files with `include = [...]`.

mod loader;

use cabinet_types::ConfirmOptions;
use regex::Regex;
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep just the message, not the input dump
		Self::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the cabinet dashboard.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this dashboard instance.
	pub dashboard: DashboardConfig,
	/// Display identity of the dashboard token.
	#[serde(default)]
	pub token: TokenConfig,
	/// Configuration for the transaction provider.
	pub provider: ProviderConfig,
	/// Configuration for the wallet signer.
	pub wallet: WalletConfig,
	/// Configuration for the reward data source.
	pub rewards: RewardsConfig,
	/// Configuration for the preference store.
	pub storage: StorageConfig,
	/// Configuration for the cabinet view state.
	#[serde(default)]
	pub cabinet: CabinetConfig,
}

/// Configuration specific to this dashboard instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
	/// Unique identifier for this dashboard instance.
	pub id: String,
}

/// Display identity of the dashboard token.
///
/// The mint address lives with the RPC implementation configuration; this
/// section only carries what the UI shows next to the balance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
	/// Ticker symbol shown next to the balance.
	#[serde(default = "default_token_symbol")]
	pub symbol: String,
	/// Full display name of the token.
	#[serde(default = "default_token_name")]
	pub name: String,
}

impl Default for TokenConfig {
	fn default() -> Self {
		Self {
			symbol: default_token_symbol(),
			name: default_token_name(),
		}
	}
}

/// Returns the default token symbol.
fn default_token_symbol() -> String {
	"DUN".to_string()
}

/// Returns the default token display name.
fn default_token_name() -> String {
	"Solhunt Token".to_string()
}

/// Configuration for the transaction provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
	/// Which RPC implementation to use as primary.
	pub primary: String,
	/// Commitment used for preflight simulation of every send.
	#[serde(default = "default_commitment")]
	pub preflight_commitment: String,
	/// Commitment a send waits for before resolving.
	#[serde(default = "default_commitment")]
	pub commitment: String,
	/// Map of RPC implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

impl ProviderConfig {
	/// Parses the commitment settings into provider options.
	///
	/// Accepted levels are `processed`, `confirmed` and `finalized`.
	pub fn confirm_options(&self) -> Result<ConfirmOptions, ConfigError> {
		let parse = |level: &str| {
			CommitmentConfig::from_str(level).map_err(|_| {
				ConfigError::Validation(format!("unknown commitment level '{}'", level))
			})
		};
		Ok(ConfirmOptions {
			preflight_commitment: parse(&self.preflight_commitment)?,
			commitment: parse(&self.commitment)?,
		})
	}
}

/// Returns the default commitment level.
///
/// The dashboard favors fast feedback over finality, matching the swap
/// surface it backs.
fn default_commitment() -> String {
	"processed".to_string()
}

/// Configuration for the wallet signer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WalletConfig {
	/// Which wallet implementation to use as primary.
	pub primary: String,
	/// Map of wallet implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the reward data source.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewardsConfig {
	/// Which reward source implementation to use as primary.
	pub primary: String,
	/// Map of reward source implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the preference store.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which preference backend to use as primary.
	pub primary: String,
	/// Map of preference backend names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the cabinet view state.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CabinetConfig {
	/// Whether the last-known snapshot stays visible across a disconnect.
	#[serde(default = "default_keep_last_snapshot")]
	pub keep_last_snapshot: bool,
	/// Preference slot holding the equipped-character identifier.
	#[serde(default = "default_character_slot")]
	pub character_slot: String,
	/// Mapping from reward item titles to equipable asset identifiers.
	#[serde(default = "default_character_map")]
	pub character_map: HashMap<String, String>,
}

impl Default for CabinetConfig {
	fn default() -> Self {
		Self {
			keep_last_snapshot: default_keep_last_snapshot(),
			character_slot: default_character_slot(),
			character_map: default_character_map(),
		}
	}
}

/// Returns the default disconnect policy.
///
/// Keeping the last snapshot visible matches the dashboard's historical
/// behavior; flipping this clears the view on disconnect instead.
fn default_keep_last_snapshot() -> bool {
	true
}

/// Returns the default preference slot for the equipped character.
fn default_character_slot() -> String {
	"character".to_string()
}

/// Returns the built-in title-to-asset mapping.
fn default_character_map() -> HashMap<String, String> {
	HashMap::from([("Green Warrior".to_string(), "green".to_string())])
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable, and
/// supports fallbacks with `${VAR_NAME:-default_value}`.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"environment variable '{}' not found",
						var_name
					)))
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply in reverse order to keep byte positions valid
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving includes and env vars.
	///
	/// Supports modular configuration through `include = ["a.toml", ...]`;
	/// each top-level section must be unique across all included files.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("invalid path: {}", path)))?;
		loader.load(file_name).await
	}

	/// Validates the configuration after parsing.
	pub(crate) fn validate(&self) -> Result<(), ConfigError> {
		if self.dashboard.id.is_empty() {
			return Err(ConfigError::Validation(
				"dashboard id cannot be empty".into(),
			));
		}

		let sections: [(&str, &str, &HashMap<String, toml::Value>); 4] = [
			(
				"provider",
				self.provider.primary.as_str(),
				&self.provider.implementations,
			),
			(
				"wallet",
				self.wallet.primary.as_str(),
				&self.wallet.implementations,
			),
			(
				"rewards",
				self.rewards.primary.as_str(),
				&self.rewards.implementations,
			),
			(
				"storage",
				self.storage.primary.as_str(),
				&self.storage.implementations,
			),
		];
		for (section, primary, implementations) in sections {
			if primary.is_empty() {
				return Err(ConfigError::Validation(format!(
					"{} primary implementation cannot be empty",
					section
				)));
			}
			if !implementations.contains_key(primary) {
				return Err(ConfigError::Validation(format!(
					"{} primary '{}' has no matching implementation section",
					section, primary
				)));
			}
		}

		// Commitment levels must parse
		self.provider.confirm_options()?;

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Self = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
