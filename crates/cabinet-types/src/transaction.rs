//! Transaction request and confirmation types for the cabinet dashboard.
//!
//! A transaction request is an opaque, caller-constructed payload; the
//! provider fills in the fee payer and recent blockhash, signs it through
//! the wallet, and submits it. It is never mutated after submission.

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;

/// An intended blockchain operation, immutable once submitted.
///
/// Callers construct the instruction list; the recent blockhash is optional
/// and fetched at send time when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
	/// Instructions to execute atomically.
	pub instructions: Vec<Instruction>,
	/// Blockhash context for the transaction, if the caller already
	/// holds one.
	pub recent_blockhash: Option<Hash>,
}

impl TransactionRequest {
	/// Creates a request from a list of instructions.
	pub fn new(instructions: Vec<Instruction>) -> Self {
		Self {
			instructions,
			recent_blockhash: None,
		}
	}

	/// Pins the request to an already-fetched blockhash.
	pub fn with_recent_blockhash(mut self, recent_blockhash: Hash) -> Self {
		self.recent_blockhash = Some(recent_blockhash);
		self
	}
}

/// Commitment levels fixed for every send through a provider instance.
///
/// Renegotiating these per call is out of scope; a provider is constructed
/// once per wallet session with the options it will use for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOptions {
	/// Commitment used for the preflight simulation of a send.
	pub preflight_commitment: CommitmentConfig,
	/// Commitment a transaction must reach before a send resolves.
	pub commitment: CommitmentConfig,
}

impl Default for ConfirmOptions {
	fn default() -> Self {
		Self {
			preflight_commitment: CommitmentConfig::processed(),
			commitment: CommitmentConfig::processed(),
		}
	}
}

/// Result of a dry-run simulation of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutcome {
	/// Program error produced by the simulated execution, if any.
	pub err: Option<String>,
	/// Log output captured during simulation.
	pub logs: Vec<String>,
	/// Compute units consumed, when the node reports them.
	pub units_consumed: Option<u64>,
}

impl SimulationOutcome {
	/// Whether the simulated execution completed without a program error.
	pub fn is_success(&self) -> bool {
		self.err.is_none()
	}
}
