//! Registry trait for self-registering implementations.
//!
//! Each implementation module (storage, wallet, RPC, rewards) provides a
//! Registry struct implementing this trait, tying its configuration name to
//! its factory function.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This matches the key used in the TOML configuration, for example
	/// `memory` for `storage.implementations.memory` or `solana` for
	/// `provider.implementations.solana`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
