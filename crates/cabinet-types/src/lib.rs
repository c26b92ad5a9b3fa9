//! Common types module for the cabinet dashboard.
//!
//! This module defines the core data types and structures shared by the
//! dashboard components. It provides a centralized location for the data
//! model so every crate speaks the same vocabulary.

/// Event types for inter-component communication.
pub mod events;
/// Notification events and the sink interface that receives them.
pub mod notification;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Reward items and the balance/reward snapshot.
pub mod snapshot;
/// Transaction request and confirmation types.
pub mod transaction;
/// Wallet availability state.
pub mod wallet;

// Re-export all types for convenient access
pub use events::*;
pub use notification::*;
pub use registry::*;
pub use snapshot::*;
pub use transaction::*;
pub use wallet::*;
