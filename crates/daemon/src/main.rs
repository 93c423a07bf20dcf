mod platform;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bouncewatch_core::{
    load_config, Engine, EngineCapabilities, LogNotifier, Notifier, OsaScriptNotifier,
    ScriptConverter,
};

use platform::{AppleScriptMounter, SystemVolumeEnumerator};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("bouncewatchd {} starting", VERSION);

    // Determine config path
    let config_path = std::env::var("BOUNCEWATCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    let notifier: Arc<dyn Notifier> = if cfg!(target_os = "macos") {
        Arc::new(OsaScriptNotifier::new())
    } else {
        Arc::new(LogNotifier::new())
    };

    let capabilities = EngineCapabilities {
        converter: Arc::new(ScriptConverter::new(config.conversion.script_path.clone())),
        enumerator: Arc::new(SystemVolumeEnumerator::new()),
        mounter: Arc::new(AppleScriptMounter::new()),
        notifier,
    };

    let handle = Engine::start(config, capabilities)
        .await
        .context("Failed to start engine")?;

    signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    handle.stop().await;

    Ok(())
}
