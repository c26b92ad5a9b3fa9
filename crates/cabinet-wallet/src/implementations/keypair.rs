//! Local keypair wallet implementation.
//!
//! Signs with an in-process ed25519 keypair, loaded from a standard Solana
//! keypair file or generated fresh for ephemeral sessions. Browser-adapter
//! wallets plug in through the same interface.

use crate::{WalletError, WalletInterface};
use async_trait::async_trait;
use cabinet_types::ImplementationRegistry;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;

/// Wallet backed by a locally-held keypair.
pub struct KeypairWallet {
	keypair: Keypair,
}

impl KeypairWallet {
	/// Creates a wallet over the given keypair.
	pub fn new(keypair: Keypair) -> Self {
		Self { keypair }
	}

	/// Loads the keypair from a standard Solana keypair file.
	pub fn from_file(path: &str) -> Result<Self, WalletError> {
		let keypair =
			read_keypair_file(path).map_err(|e| WalletError::InvalidKey(e.to_string()))?;
		Ok(Self::new(keypair))
	}
}

#[async_trait]
impl WalletInterface for KeypairWallet {
	fn public_key(&self) -> Result<Pubkey, WalletError> {
		Ok(self.keypair.pubkey())
	}

	async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction, WalletError> {
		let recent_blockhash = transaction.message.recent_blockhash;
		transaction
			.try_sign(&[&self.keypair], recent_blockhash)
			.map_err(|e| WalletError::Signing(e.to_string()))?;
		Ok(transaction)
	}
}

/// Factory function to create a keypair wallet from configuration.
///
/// Configuration parameters:
/// - `keypair_path` (optional): path to a Solana keypair file. When absent,
///   a fresh ephemeral keypair is generated.
pub fn create_wallet(config: &toml::Value) -> Result<Box<dyn WalletInterface>, WalletError> {
	let wallet = match config.get("keypair_path").and_then(|v| v.as_str()) {
		Some(path) => KeypairWallet::from_file(path)?,
		None => KeypairWallet::new(Keypair::new()),
	};
	Ok(Box::new(wallet))
}

/// Registry for the keypair wallet implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "keypair";
	type Factory = crate::WalletFactory;

	fn factory() -> Self::Factory {
		create_wallet
	}
}

impl crate::WalletRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use solana_sdk::hash::Hash;
	use solana_sdk::system_instruction;

	#[tokio::test]
	async fn test_signs_with_payer_key() {
		let wallet = KeypairWallet::new(Keypair::new());
		let payer = wallet.public_key().unwrap();
		let destination = Pubkey::new_unique();

		let instruction = system_instruction::transfer(&payer, &destination, 1);
		let mut transaction = Transaction::new_with_payer(&[instruction], Some(&payer));
		transaction.message.recent_blockhash = Hash::new_unique();

		let signed = wallet.sign_transaction(transaction).await.unwrap();
		assert!(signed.is_signed());
	}

	#[tokio::test]
	async fn test_factory_generates_ephemeral_keypair() {
		let config = toml::Value::Table(Default::default());
		let wallet = create_wallet(&config).unwrap();
		assert!(wallet.public_key().is_ok());
	}
}
