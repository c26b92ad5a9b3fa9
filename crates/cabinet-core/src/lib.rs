//! Core engine for the cabinet dashboard.
//!
//! This module wires the dashboard services together: the notifying
//! provider over the RPC connection and wallet session, the snapshot
//! monitor that follows wallet availability, the character selector, and
//! the event bus everything reports into. The UI shell in front of it is
//! an external collaborator; the engine exposes state and services, not
//! pixels.

use cabinet_config::Config;
use cabinet_provider::NotifyingProvider;
use cabinet_rewards::RewardsService;
use cabinet_storage::PreferenceStore;
use cabinet_types::{CabinetEvent, CabinetSnapshot, NotificationEvent, SnapshotEvent, WalletEvent};
use cabinet_wallet::WalletSession;
use std::sync::Arc;
use thiserror::Error;

pub mod builder;
pub mod event_bus;
pub mod monitor;
pub mod selection;
pub mod sinks;

pub use builder::{CabinetBuilder, CabinetFactories};
pub use event_bus::EventBus;
pub use monitor::SnapshotMonitor;
pub use selection::{CharacterSelector, DEFAULT_CHARACTER};

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
	/// Error related to configuration issues.
	#[error("configuration error: {0}")]
	Config(String),
	/// Error from one of the dashboard services.
	#[error("service error: {0}")]
	Service(String),
}

/// Main engine that owns the dashboard services.
///
/// One engine exists per wallet session; the provider it constructs is
/// pinned to that session for its lifetime.
pub struct CabinetEngine {
	/// Dashboard configuration.
	pub(crate) config: Config,
	/// Preference store backing the character selection.
	pub(crate) storage: Arc<PreferenceStore>,
	/// The wallet session driving availability transitions.
	pub(crate) wallet: Arc<WalletSession>,
	/// The notifying provider handed to transaction-issuing features.
	pub(crate) provider: Arc<NotifyingProvider>,
	/// Reward data service.
	pub(crate) rewards: Arc<RewardsService>,
	/// Snapshot monitor reacting to wallet availability.
	pub(crate) monitor: SnapshotMonitor,
	/// Character selector over the preference store.
	pub(crate) selector: CharacterSelector,
	/// Event bus for inter-component communication.
	pub(crate) event_bus: EventBus,
}

impl CabinetEngine {
	/// Main loop: starts the snapshot monitor and reports events until
	/// interrupted.
	pub async fn run(&self) -> Result<(), EngineError> {
		// Start snapshot monitoring
		let monitor = self.monitor.clone();
		let availability = self.wallet.subscribe();
		let monitor_task = tokio::spawn(async move {
			monitor.run(availability).await;
		});

		let mut events = self.event_bus.subscribe();
		let mut wallet_changes = self.wallet.subscribe();

		loop {
			tokio::select! {
				// Report events
				Ok(event) = events.recv() => {
					self.handle_event(event);
				}

				// Mirror wallet transitions onto the bus
				changed = wallet_changes.changed() => {
					if changed.is_err() {
						break;
					}
					let availability = *wallet_changes.borrow();
					self.event_bus
						.publish(CabinetEvent::Wallet(WalletEvent::AvailabilityChanged {
							availability,
						}))
						.ok();
				}

				// Shutdown signal
				_ = tokio::signal::ctrl_c() => {
					break;
				}
			}
		}

		monitor_task.abort();
		Ok(())
	}

	/// Reports one event through tracing.
	fn handle_event(&self, event: CabinetEvent) {
		match event {
			CabinetEvent::Notification(NotificationEvent::Confirmed { signature }) => {
				tracing::info!(signature = %signature, "Transaction sent");
			}
			CabinetEvent::Notification(NotificationEvent::Failed { error }) => {
				tracing::error!(error = %error, "Transaction failed");
			}
			CabinetEvent::Wallet(WalletEvent::AvailabilityChanged { availability }) => {
				tracing::info!(availability = ?availability, "Wallet availability changed");
			}
			CabinetEvent::Snapshot(SnapshotEvent::RefreshStarted { public_key }) => {
				tracing::debug!(public_key = %public_key, "Snapshot refresh started");
			}
			CabinetEvent::Snapshot(SnapshotEvent::Refreshed {
				public_key,
				token_balance,
				rewarded,
				purchased,
			}) => {
				tracing::info!(
					public_key = %public_key,
					token_balance = token_balance,
					rewarded = rewarded,
					purchased = purchased,
					token = %self.config.token.symbol,
					"Snapshot refreshed"
				);
			}
			CabinetEvent::Snapshot(SnapshotEvent::RefreshFailed { public_key, error }) => {
				tracing::warn!(public_key = %public_key, error = %error, "Snapshot refresh failed");
			}
			CabinetEvent::Snapshot(SnapshotEvent::Superseded { public_key }) => {
				tracing::debug!(public_key = %public_key, "Superseded snapshot refresh discarded");
			}
		}
	}

	/// The notifying provider for transaction-issuing features.
	pub fn provider(&self) -> &Arc<NotifyingProvider> {
		&self.provider
	}

	/// The wallet session.
	pub fn wallet(&self) -> &Arc<WalletSession> {
		&self.wallet
	}

	/// The reward data service.
	pub fn rewards(&self) -> &Arc<RewardsService> {
		&self.rewards
	}

	/// The character selector.
	pub fn selector(&self) -> &CharacterSelector {
		&self.selector
	}

	/// The preference store.
	pub fn storage(&self) -> &Arc<PreferenceStore> {
		&self.storage
	}

	/// A copy of the current balance/reward snapshot.
	pub async fn snapshot(&self) -> CabinetSnapshot {
		self.monitor.current().await
	}

	/// The event bus.
	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// The configuration the engine was built from.
	pub fn config(&self) -> &Config {
		&self.config
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn factories() -> CabinetFactories {
		CabinetFactories {
			storage_factories: cabinet_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			wallet_factories: cabinet_wallet::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			rpc_factories: cabinet_provider::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			rewards_factories: cabinet_rewards::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}

	fn test_config() -> Config {
		r#"
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

[rewards]
primary = "fixture"
[rewards.implementations.fixture]

[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse()
		.unwrap()
	}

	#[tokio::test]
	async fn test_builder_wires_the_engine_from_config() {
		let engine = CabinetBuilder::new(test_config(), factories())
			.build()
			.unwrap();

		// no I/O has happened yet: snapshot is pristine, wallet disconnected
		assert_eq!(engine.snapshot().await, CabinetSnapshot::default());
		assert!(!engine.wallet().availability().is_connected());

		// the built-in character map is live
		let equipped = engine.selector().toggle("Green Warrior").await.unwrap();
		assert_eq!(equipped.as_deref(), Some("green"));
	}

	#[tokio::test]
	async fn test_builder_rejects_unknown_primary() {
		let mut factories = factories();
		factories.rewards_factories = HashMap::new();

		let result = CabinetBuilder::new(test_config(), factories).build();
		assert!(matches!(result, Err(EngineError::Config(_))));
	}
}
