//! Notification sink implementations.
//!
//! The provider and the snapshot monitor deliver outcomes through the
//! [`NotificationSink`] interface; these are the two implementations the
//! engine ships. A UI embeds its own sink instead.

use crate::event_bus::EventBus;
use cabinet_types::{CabinetEvent, NotificationEvent, NotificationSink, NotifyError};

/// Sink that republishes notifications onto the event bus.
pub struct BusSink {
	bus: EventBus,
}

impl BusSink {
	/// Creates a sink publishing onto the given bus.
	pub fn new(bus: EventBus) -> Self {
		Self { bus }
	}
}

impl NotificationSink for BusSink {
	fn notify(&self, event: NotificationEvent) -> Result<(), NotifyError> {
		// A bus without subscribers drops the event; that is fine here
		self.bus.publish(CabinetEvent::Notification(event)).ok();
		Ok(())
	}
}

/// Sink that logs notifications through tracing.
pub struct TracingSink;

impl NotificationSink for TracingSink {
	fn notify(&self, event: NotificationEvent) -> Result<(), NotifyError> {
		match &event {
			NotificationEvent::Confirmed { signature } => {
				// explorer_url is always present for confirmed events
				let url = event.explorer_url().unwrap_or_default();
				tracing::info!(signature = %signature, url = %url, "Transaction sent");
			}
			NotificationEvent::Failed { error } => {
				tracing::error!(error = %error, "Transaction failed");
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use solana_sdk::signature::Signature;

	#[tokio::test]
	async fn test_bus_sink_republishes_notifications() {
		let bus = EventBus::new(16);
		let mut receiver = bus.subscribe();
		let sink = BusSink::new(bus);

		let signature = Signature::new_unique();
		sink.notify(NotificationEvent::confirmed(signature)).unwrap();

		match receiver.recv().await.unwrap() {
			CabinetEvent::Notification(event) => {
				assert_eq!(event.signature(), Some(&signature));
			}
			other => panic!("unexpected event: {:?}", other),
		}
	}

	#[test]
	fn test_tracing_sink_accepts_both_variants() {
		let sink = TracingSink;
		sink.notify(NotificationEvent::confirmed(Signature::new_unique()))
			.unwrap();
		sink.notify(NotificationEvent::failed("boom")).unwrap();
	}
}
