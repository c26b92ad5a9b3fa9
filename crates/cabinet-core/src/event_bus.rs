//! Event bus for inter-component communication.
//!
//! A thin wrapper over a tokio broadcast channel. Publishing is
//! fire-and-forget: events are observability, and a missing subscriber is
//! not an error the producer cares about.

use cabinet_types::CabinetEvent;
use tokio::sync::broadcast;

/// Broadcast bus carrying [`CabinetEvent`]s.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<CabinetEvent>,
}

impl EventBus {
	/// Creates a bus retaining up to `capacity` undelivered events per
	/// subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	///
	/// Returns the number of subscribers reached; callers ignore the
	/// result with `.ok()`.
	pub fn publish(
		&self,
		event: CabinetEvent,
	) -> Result<usize, broadcast::error::SendError<CabinetEvent>> {
		self.sender.send(event)
	}

	/// Subscribes to events published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<CabinetEvent> {
		self.sender.subscribe()
	}
}
