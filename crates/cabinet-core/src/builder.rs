//! Builder for constructing a cabinet engine with pluggable implementations.
//!
//! The builder resolves each configured `primary` implementation through a
//! factory map, wires the services together, and hands back a ready engine.

use crate::event_bus::EventBus;
use crate::monitor::SnapshotMonitor;
use crate::selection::CharacterSelector;
use crate::sinks::BusSink;
use crate::{CabinetEngine, EngineError};
use cabinet_config::Config;
use cabinet_provider::{NotifyingProvider, RpcFactory};
use cabinet_rewards::{RewardsFactory, RewardsService};
use cabinet_storage::{PreferenceStore, StorageFactory};
use cabinet_wallet::{WalletFactory, WalletSession};
use std::collections::HashMap;
use std::sync::Arc;

/// Capacity of the engine's event bus.
const EVENT_BUS_CAPACITY: usize = 1000;

/// Factory maps for every pluggable component.
pub struct CabinetFactories {
	/// Preference backend factories by configuration name.
	pub storage_factories: HashMap<String, StorageFactory>,
	/// Wallet implementation factories by configuration name.
	pub wallet_factories: HashMap<String, WalletFactory>,
	/// RPC client factories by configuration name.
	pub rpc_factories: HashMap<String, RpcFactory>,
	/// Reward source factories by configuration name.
	pub rewards_factories: HashMap<String, RewardsFactory>,
}

/// Builder for constructing a [`CabinetEngine`].
pub struct CabinetBuilder {
	config: Config,
	factories: CabinetFactories,
}

impl CabinetBuilder {
	/// Creates a builder from a validated configuration and factory maps.
	pub fn new(config: Config, factories: CabinetFactories) -> Self {
		Self { config, factories }
	}

	/// Builds the engine, instantiating every configured implementation.
	pub fn build(self) -> Result<CabinetEngine, EngineError> {
		let config = self.config;
		let event_bus = EventBus::new(EVENT_BUS_CAPACITY);

		// Preference store
		let storage_backend = resolve(
			"storage",
			&config.storage.primary,
			&config.storage.implementations,
			&self.factories.storage_factories,
		)?;
		let storage = Arc::new(PreferenceStore::new(storage_backend));

		// Wallet session
		let wallet_backend = resolve(
			"wallet",
			&config.wallet.primary,
			&config.wallet.implementations,
			&self.factories.wallet_factories,
		)?;
		let wallet = Arc::new(WalletSession::new(Arc::from(wallet_backend)));

		// RPC connection
		let connection = resolve(
			"provider",
			&config.provider.primary,
			&config.provider.implementations,
			&self.factories.rpc_factories,
		)?;

		// Reward source
		let reward_source = resolve(
			"rewards",
			&config.rewards.primary,
			&config.rewards.implementations,
			&self.factories.rewards_factories,
		)?;
		let rewards = Arc::new(RewardsService::new(reward_source));

		let options = config
			.provider
			.confirm_options()
			.map_err(|e| EngineError::Config(e.to_string()))?;

		// One provider per wallet session; the bus sink observes every send
		let sink = Arc::new(BusSink::new(event_bus.clone()));
		let provider = Arc::new(NotifyingProvider::new(
			Arc::from(connection),
			wallet.clone(),
			options,
			sink.clone(),
		));

		let monitor = SnapshotMonitor::new(
			provider.clone(),
			rewards.clone(),
			sink,
			event_bus.clone(),
			config.cabinet.keep_last_snapshot,
		);

		let selector = CharacterSelector::new(
			storage.clone(),
			config.cabinet.character_slot.clone(),
			config.cabinet.character_map.clone(),
		);

		Ok(CabinetEngine {
			config,
			storage,
			wallet,
			provider,
			rewards,
			monitor,
			selector,
			event_bus,
		})
	}
}

/// Resolves one component through its factory map.
fn resolve<T: ?Sized, E: std::fmt::Display>(
	section: &str,
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
	factories: &HashMap<String, fn(&toml::Value) -> Result<Box<T>, E>>,
) -> Result<Box<T>, EngineError> {
	let factory = factories.get(primary).ok_or_else(|| {
		EngineError::Config(format!(
			"no {} factory registered for '{}'",
			section, primary
		))
	})?;
	let implementation_config = implementations.get(primary).ok_or_else(|| {
		EngineError::Config(format!(
			"missing [{}.implementations.{}] section",
			section, primary
		))
	})?;

	let implementation = factory(implementation_config).map_err(|e| {
		tracing::error!(
			component = section,
			implementation = %primary,
			error = %e,
			"Failed to create implementation"
		);
		EngineError::Config(format!(
			"failed to create {} implementation '{}': {}",
			section, primary, e
		))
	})?;
	tracing::info!(component = section, implementation = %primary, "Loaded");

	Ok(implementation)
}
