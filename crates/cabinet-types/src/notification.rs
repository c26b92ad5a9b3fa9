//! Notification events and the sink interface that receives them.
//!
//! Every send produces exactly one notification: a signature on success or
//! an error cause on failure, never both and never neither. The sink is an
//! injected dependency so the core stays decoupled from any UI toolkit.

use serde::{Deserialize, Serialize};
use solana_sdk::signature::Signature;
use thiserror::Error;

/// Base URL for rendering a confirmed signature as an explorer link.
const EXPLORER_TX_URL: &str = "https://explorer.solana.com/tx";

/// Errors a notification sink may report back.
///
/// Sink errors are logged and discarded by the caller; they never corrupt
/// the operation that produced the notification.
#[derive(Debug, Error)]
pub enum NotifyError {
	/// The sink could not accept the notification.
	#[error("sink rejected notification: {0}")]
	Rejected(String),
}

/// A single observation of a send outcome or a surfaced background error.
///
/// The two variants make the exactly-one-of-{signature, error} invariant
/// structural: a value of this type cannot carry both or neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationEvent {
	/// A transaction was submitted and confirmed.
	Confirmed {
		/// Identifier the network assigned to the transaction.
		signature: Signature,
	},
	/// An operation failed.
	Failed {
		/// Human-readable cause.
		error: String,
	},
}

impl NotificationEvent {
	/// Creates a success notification for a confirmed signature.
	pub fn confirmed(signature: Signature) -> Self {
		Self::Confirmed { signature }
	}

	/// Creates a failure notification with the given cause.
	pub fn failed(error: impl Into<String>) -> Self {
		Self::Failed {
			error: error.into(),
		}
	}

	/// The confirmed signature, when this is a success notification.
	pub fn signature(&self) -> Option<&Signature> {
		match self {
			Self::Confirmed { signature } => Some(signature),
			Self::Failed { .. } => None,
		}
	}

	/// The failure cause, when this is a failure notification.
	pub fn error(&self) -> Option<&str> {
		match self {
			Self::Confirmed { .. } => None,
			Self::Failed { error } => Some(error),
		}
	}

	/// Explorer link for a confirmed transaction.
	pub fn explorer_url(&self) -> Option<String> {
		self.signature()
			.map(|signature| format!("{}/{}", EXPLORER_TX_URL, signature))
	}
}

/// Interface for the UI callback that turns notifications into toasts.
///
/// Implementations must not block: hand the event to a channel or a
/// non-blocking UI queue and return. The caller invokes this exactly once
/// per observed outcome and discards any error it returns.
pub trait NotificationSink: Send + Sync {
	/// Delivers one notification event.
	fn notify(&self, event: NotificationEvent) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_event_carries_exactly_one_side() {
		let signature = Signature::new_unique();
		let confirmed = NotificationEvent::confirmed(signature);
		assert_eq!(confirmed.signature(), Some(&signature));
		assert!(confirmed.error().is_none());

		let failed = NotificationEvent::failed("boom");
		assert!(failed.signature().is_none());
		assert_eq!(failed.error(), Some("boom"));
	}

	#[test]
	fn test_explorer_url_only_for_confirmed() {
		let signature = Signature::new_unique();
		let confirmed = NotificationEvent::confirmed(signature);
		let url = confirmed.explorer_url().unwrap();
		assert_eq!(
			url,
			format!("https://explorer.solana.com/tx/{}", signature)
		);

		assert!(NotificationEvent::failed("boom").explorer_url().is_none());
	}
}
