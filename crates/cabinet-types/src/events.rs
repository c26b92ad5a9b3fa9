//! Event types for inter-component communication.
//!
//! Events flow through a broadcast bus so loosely-coupled consumers (the
//! service log, a future UI bridge) can react to state changes without the
//! producers knowing about them. They are observability, not control flow:
//! publishing is always fire-and-forget.

use crate::{NotificationEvent, WalletAvailability};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Main event type encompassing all dashboard events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CabinetEvent {
	/// A send outcome or surfaced error, as delivered to notification sinks.
	Notification(NotificationEvent),
	/// Wallet availability changed.
	Wallet(WalletEvent),
	/// Snapshot monitor activity.
	Snapshot(SnapshotEvent),
}

/// Events related to wallet availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WalletEvent {
	/// Availability transitioned to the given state.
	AvailabilityChanged {
		availability: WalletAvailability,
	},
}

/// Events related to balance/reward snapshot refreshes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SnapshotEvent {
	/// A refresh started for the given public key.
	RefreshStarted { public_key: Pubkey },
	/// A refresh completed and the snapshot was replaced.
	Refreshed {
		public_key: Pubkey,
		token_balance: f64,
		rewarded: usize,
		purchased: usize,
	},
	/// A refresh failed; the error was mirrored to the notification sink.
	RefreshFailed { public_key: Pubkey, error: String },
	/// A refresh resolved after its key was superseded and was discarded.
	Superseded { public_key: Pubkey },
}
