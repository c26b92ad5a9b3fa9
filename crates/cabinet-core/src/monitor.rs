//! Balance/reward snapshot monitoring.
//!
//! Watches wallet availability and refreshes the cabinet snapshot each
//! time a wallet becomes available, including the state observed at
//! startup. Fetch results are applied wholesale; a result that arrives
//! after its key was superseded is discarded by comparing the key the
//! fetch started for against the currently-active key.

use crate::event_bus::EventBus;
use crate::EngineError;
use cabinet_provider::NotifyingProvider;
use cabinet_rewards::RewardsService;
use cabinet_types::{
	CabinetEvent, CabinetSnapshot, NotificationEvent, NotificationSink, SnapshotEvent,
	WalletAvailability,
};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Refreshes the cabinet snapshot on wallet-availability transitions.
#[derive(Clone)]
pub struct SnapshotMonitor {
	/// Provider used for the balance query.
	provider: Arc<NotifyingProvider>,
	/// Source of reward-item data.
	rewards: Arc<RewardsService>,
	/// Sink that surfaces refresh failures, shared with the provider.
	sink: Arc<dyn NotificationSink>,
	/// Bus for observability events.
	event_bus: EventBus,
	/// The snapshot; replaced wholesale on each successful refresh.
	snapshot: Arc<RwLock<CabinetSnapshot>>,
	/// Whether the last-known snapshot stays visible across a disconnect.
	keep_last_snapshot: bool,
}

impl SnapshotMonitor {
	/// Creates a monitor over the given provider and reward source.
	pub fn new(
		provider: Arc<NotifyingProvider>,
		rewards: Arc<RewardsService>,
		sink: Arc<dyn NotificationSink>,
		event_bus: EventBus,
		keep_last_snapshot: bool,
	) -> Self {
		Self {
			provider,
			rewards,
			sink,
			event_bus,
			snapshot: Arc::new(RwLock::new(CabinetSnapshot::default())),
			keep_last_snapshot,
		}
	}

	/// Shared handle to the snapshot, for the state layer.
	pub fn snapshot_handle(&self) -> Arc<RwLock<CabinetSnapshot>> {
		self.snapshot.clone()
	}

	/// A copy of the current snapshot.
	pub async fn current(&self) -> CabinetSnapshot {
		self.snapshot.read().await.clone()
	}

	/// Reacts to availability transitions until the session is dropped.
	///
	/// The state present when `run` starts is acted on too, so a wallet
	/// that is already connected gets its initial refresh.
	pub async fn run(&self, mut availability: watch::Receiver<WalletAvailability>) {
		loop {
			let current = *availability.borrow_and_update();
			match current {
				WalletAvailability::Connected(public_key) => {
					let monitor = self.clone();
					let guard = availability.clone();
					tokio::spawn(async move {
						monitor.refresh(public_key, guard).await;
					});
				}
				WalletAvailability::Disconnected => self.handle_disconnect().await,
			}

			if availability.changed().await.is_err() {
				break;
			}
		}
	}

	/// Runs one refresh cycle for `public_key`.
	async fn refresh(&self, public_key: Pubkey, availability: watch::Receiver<WalletAvailability>) {
		self.snapshot.write().await.loading = true;
		self.event_bus
			.publish(CabinetEvent::Snapshot(SnapshotEvent::RefreshStarted {
				public_key,
			}))
			.ok();

		let result = self.fetch(public_key).await;

		// Stale guard: the key this fetch started for must still be active
		let current = *availability.borrow();
		if current.public_key() != Some(public_key) {
			tracing::debug!(public_key = %public_key, "Discarding superseded snapshot refresh");
			if !current.is_connected() {
				// re-apply the disconnect policy so loading never sticks
				self.handle_disconnect().await;
			}
			self.event_bus
				.publish(CabinetEvent::Snapshot(SnapshotEvent::Superseded {
					public_key,
				}))
				.ok();
			return;
		}

		match result {
			Ok(fresh) => {
				let token_balance = fresh.token_balance;
				let rewarded = fresh.rewarded_items.len();
				let purchased = fresh.purchased_items.len();
				*self.snapshot.write().await = fresh;
				self.event_bus
					.publish(CabinetEvent::Snapshot(SnapshotEvent::Refreshed {
						public_key,
						token_balance,
						rewarded,
						purchased,
					}))
					.ok();
			}
			Err(error) => {
				// Never leave the view stuck in loading
				self.snapshot.write().await.loading = false;

				let message = error.to_string();
				if let Err(sink_error) = self
					.sink
					.notify(NotificationEvent::failed(message.clone()))
				{
					tracing::warn!(error = %sink_error, "Notification sink rejected event");
				}
				self.event_bus
					.publish(CabinetEvent::Snapshot(SnapshotEvent::RefreshFailed {
						public_key,
						error: message,
					}))
					.ok();
			}
		}
	}

	/// Fetches a complete snapshot for `public_key`.
	async fn fetch(&self, public_key: Pubkey) -> Result<CabinetSnapshot, EngineError> {
		let token_balance = self
			.provider
			.token_balance(&public_key)
			.await
			.map_err(|e| EngineError::Service(e.to_string()))?;
		let collection = self
			.rewards
			.fetch(&public_key)
			.await
			.map_err(|e| EngineError::Service(e.to_string()))?;

		Ok(CabinetSnapshot {
			token_balance,
			rewarded_items: collection.rewarded,
			purchased_items: collection.purchased,
			loading: false,
		})
	}

	/// Applies the configured disconnect policy.
	async fn handle_disconnect(&self) {
		let mut snapshot = self.snapshot.write().await;
		if self.keep_last_snapshot {
			// Last-known data stays visible; only settle the loading flag
			snapshot.loading = false;
		} else {
			*snapshot = CabinetSnapshot::default();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use cabinet_provider::{ProviderError, RpcInterface};
	use cabinet_rewards::{RewardSource, RewardsError};
	use cabinet_types::{
		ConfirmOptions, RewardCollection, RewardItem, SimulationOutcome,
	};
	use cabinet_wallet::implementations::keypair::KeypairWallet;
	use cabinet_wallet::WalletSession;
	use solana_sdk::commitment_config::CommitmentConfig;
	use solana_sdk::hash::Hash;
	use solana_sdk::signature::{Keypair, Signature};
	use solana_sdk::transaction::Transaction;
	use std::collections::HashMap;
	use std::sync::Mutex;
	use std::time::Duration;

	struct TestRpc {
		balances: HashMap<Pubkey, f64>,
	}

	#[async_trait]
	impl RpcInterface for TestRpc {
		async fn send_and_confirm(
			&self,
			_transaction: &Transaction,
			_options: &ConfirmOptions,
		) -> Result<Signature, ProviderError> {
			Err(ProviderError::Network("not wired in this test".to_string()))
		}

		async fn simulate(
			&self,
			_transaction: &Transaction,
		) -> Result<SimulationOutcome, ProviderError> {
			Err(ProviderError::Network("not wired in this test".to_string()))
		}

		async fn confirm(
			&self,
			_signature: &Signature,
			_commitment: CommitmentConfig,
		) -> Result<bool, ProviderError> {
			Ok(false)
		}

		async fn latest_blockhash(
			&self,
			_commitment: CommitmentConfig,
		) -> Result<Hash, ProviderError> {
			Ok(Hash::new_unique())
		}

		async fn token_balance(&self, owner: &Pubkey) -> Result<f64, ProviderError> {
			Ok(*self.balances.get(owner).unwrap_or(&0.0))
		}
	}

	struct DelayedRewards {
		/// Per-key fetch delay and result.
		responses: HashMap<Pubkey, (Duration, RewardCollection)>,
	}

	#[async_trait]
	impl RewardSource for DelayedRewards {
		async fn fetch(&self, owner: &Pubkey) -> Result<RewardCollection, RewardsError> {
			match self.responses.get(owner) {
				Some((delay, collection)) => {
					tokio::time::sleep(*delay).await;
					Ok(collection.clone())
				}
				None => Err(RewardsError::Network("rewards service down".to_string())),
			}
		}
	}

	struct RecordingSink {
		events: Mutex<Vec<NotificationEvent>>,
	}

	impl NotificationSink for RecordingSink {
		fn notify(&self, event: NotificationEvent) -> Result<(), cabinet_types::NotifyError> {
			self.events.lock().unwrap().push(event);
			Ok(())
		}
	}

	fn item(title: &str) -> RewardItem {
		RewardItem {
			title: title.to_string(),
			category: "trophies".to_string(),
			image: format!("{}.png", title),
			content: String::new(),
			attributes: Vec::new(),
		}
	}

	fn collection(title: &str) -> RewardCollection {
		RewardCollection {
			rewarded: vec![item(title)],
			purchased: Vec::new(),
		}
	}

	fn monitor_over(
		rpc: TestRpc,
		rewards: DelayedRewards,
		sink: Arc<dyn NotificationSink>,
		keep_last_snapshot: bool,
	) -> SnapshotMonitor {
		let wallet = Arc::new(WalletSession::new(Arc::new(KeypairWallet::new(
			Keypair::new(),
		))));
		let provider = Arc::new(NotifyingProvider::new(
			Arc::new(rpc),
			wallet,
			ConfirmOptions::default(),
			sink.clone(),
		));
		SnapshotMonitor::new(
			provider,
			Arc::new(RewardsService::new(Box::new(rewards))),
			sink,
			EventBus::new(64),
			keep_last_snapshot,
		)
	}

	fn spawn_monitor(
		monitor: &SnapshotMonitor,
		availability: watch::Receiver<WalletAvailability>,
	) {
		let runner = monitor.clone();
		tokio::spawn(async move {
			runner.run(availability).await;
		});
	}

	#[tokio::test(start_paused = true)]
	async fn test_initial_connected_state_triggers_a_refresh() {
		let owner = Pubkey::new_unique();
		let monitor = monitor_over(
			TestRpc {
				balances: HashMap::from([(owner, 12.5)]),
			},
			DelayedRewards {
				responses: HashMap::from([(owner, (Duration::ZERO, collection("Castle Crest")))]),
			},
			Arc::new(RecordingSink {
				events: Mutex::new(Vec::new()),
			}),
			true,
		);

		let (_sender, receiver) =
			watch::channel(WalletAvailability::Connected(owner));
		spawn_monitor(&monitor, receiver);
		tokio::time::sleep(Duration::from_millis(50)).await;

		let snapshot = monitor.current().await;
		assert_eq!(snapshot.token_balance, 12.5);
		assert_eq!(snapshot.rewarded_items[0].title, "Castle Crest");
		assert!(!snapshot.loading);
	}

	#[tokio::test(start_paused = true)]
	async fn test_late_result_for_superseded_key_is_discarded() {
		let key_a = Pubkey::new_unique();
		let key_b = Pubkey::new_unique();
		let monitor = monitor_over(
			TestRpc {
				balances: HashMap::from([(key_a, 1.0), (key_b, 2.0)]),
			},
			DelayedRewards {
				responses: HashMap::from([
					(key_a, (Duration::from_millis(300), collection("from-a"))),
					(key_b, (Duration::from_millis(50), collection("from-b"))),
				]),
			},
			Arc::new(RecordingSink {
				events: Mutex::new(Vec::new()),
			}),
			true,
		);

		let (sender, receiver) = watch::channel(WalletAvailability::Connected(key_a));
		spawn_monitor(&monitor, receiver);

		// Supersede A with B while A's fetch is still in flight
		tokio::time::sleep(Duration::from_millis(10)).await;
		sender.send_replace(WalletAvailability::Connected(key_b));

		// Let both fetches resolve; A finishes after B
		tokio::time::sleep(Duration::from_millis(500)).await;

		let snapshot = monitor.current().await;
		assert_eq!(snapshot.token_balance, 2.0);
		assert_eq!(snapshot.rewarded_items[0].title, "from-b");
		assert!(!snapshot.loading);
	}

	#[tokio::test(start_paused = true)]
	async fn test_failed_refresh_clears_loading_and_notifies() {
		let owner = Pubkey::new_unique();
		let sink = Arc::new(RecordingSink {
			events: Mutex::new(Vec::new()),
		});
		let monitor = monitor_over(
			TestRpc {
				balances: HashMap::from([(owner, 5.0)]),
			},
			// no response configured: the fetch fails
			DelayedRewards {
				responses: HashMap::new(),
			},
			sink.clone(),
			true,
		);

		let (_sender, receiver) =
			watch::channel(WalletAvailability::Connected(owner));
		spawn_monitor(&monitor, receiver);
		tokio::time::sleep(Duration::from_millis(50)).await;

		let snapshot = monitor.current().await;
		assert!(!snapshot.loading);
		assert!(snapshot.rewarded_items.is_empty());

		let events = sink.events.lock().unwrap();
		assert_eq!(events.len(), 1);
		assert!(events[0].error().unwrap().contains("rewards service down"));
	}

	#[tokio::test(start_paused = true)]
	async fn test_disconnect_keeps_last_snapshot_by_default() {
		let owner = Pubkey::new_unique();
		let monitor = monitor_over(
			TestRpc {
				balances: HashMap::from([(owner, 7.0)]),
			},
			DelayedRewards {
				responses: HashMap::from([(owner, (Duration::ZERO, collection("Castle Crest")))]),
			},
			Arc::new(RecordingSink {
				events: Mutex::new(Vec::new()),
			}),
			true,
		);

		let (sender, receiver) = watch::channel(WalletAvailability::Connected(owner));
		spawn_monitor(&monitor, receiver);
		tokio::time::sleep(Duration::from_millis(50)).await;

		sender.send_replace(WalletAvailability::Disconnected);
		tokio::time::sleep(Duration::from_millis(50)).await;

		let snapshot = monitor.current().await;
		assert_eq!(snapshot.token_balance, 7.0);
		assert_eq!(snapshot.rewarded_items[0].title, "Castle Crest");
	}

	#[tokio::test(start_paused = true)]
	async fn test_disconnect_clears_snapshot_when_configured() {
		let owner = Pubkey::new_unique();
		let monitor = monitor_over(
			TestRpc {
				balances: HashMap::from([(owner, 7.0)]),
			},
			DelayedRewards {
				responses: HashMap::from([(owner, (Duration::ZERO, collection("Castle Crest")))]),
			},
			Arc::new(RecordingSink {
				events: Mutex::new(Vec::new()),
			}),
			false,
		);

		let (sender, receiver) = watch::channel(WalletAvailability::Connected(owner));
		spawn_monitor(&monitor, receiver);
		tokio::time::sleep(Duration::from_millis(50)).await;

		sender.send_replace(WalletAvailability::Disconnected);
		tokio::time::sleep(Duration::from_millis(50)).await;

		let snapshot = monitor.current().await;
		assert_eq!(snapshot, CabinetSnapshot::default());
	}
}
