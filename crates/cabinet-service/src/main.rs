//! Main entry point for the cabinet dashboard service.
//!
//! Runs the dashboard core headless: loads configuration, wires the
//! pluggable implementations, connects the configured wallet and reports
//! every notification and snapshot refresh through tracing. A UI shell
//! embeds the same engine and swaps the tracing reporting for toasts.

use cabinet_config::Config;
use cabinet_core::{CabinetBuilder, CabinetFactories};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;

/// Command-line arguments for the cabinet service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Collects every registered implementation into factory maps.
fn all_factories() -> CabinetFactories {
	fn into_map<F>(implementations: Vec<(&'static str, F)>) -> HashMap<String, F> {
		implementations
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect()
	}

	CabinetFactories {
		storage_factories: into_map(cabinet_storage::get_all_implementations()),
		wallet_factories: into_map(cabinet_wallet::get_all_implementations()),
		rpc_factories: into_map(cabinet_provider::get_all_implementations()),
		rewards_factories: into_map(cabinet_rewards::get_all_implementations()),
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	tracing::info!("Started cabinet");

	// Load configuration
	let config_path = args
		.config
		.to_str()
		.ok_or("configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.dashboard.id);

	// Build the engine with all registered implementations
	let engine = CabinetBuilder::new(config, all_factories()).build()?;

	// Stand in for the external connection flow: bring the configured
	// wallet up so the snapshot monitor has something to follow
	let public_key = engine.wallet().connect()?;
	tracing::info!(public_key = %public_key, "Wallet connected");

	let character = engine.selector().current().await?;
	tracing::info!(character = %character, "Equipped character loaded");

	engine.run().await?;

	tracing::info!("Stopped cabinet");
	Ok(())
}
