//! # Apostille Ledger Node Runtime
//!
//! Hosts the document registry and serves it over stdin/stdout.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment (`AL_*`)
//! 2. Initialize logging (stderr, so stdout carries only responses)
//! 3. Open the storage backend and build the registry
//! 4. Serve command lines until EOF or Ctrl+C
//!
//! ## Example
//!
//! ```text
//! $ echo '{"op":"documentExists","documentID":"D1"}' | AL_STORAGE_BACKEND=file AL_DATA_DIR=./data node-runtime
//! {"ok":true,"result":false}
//! ```

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use node_runtime::container::{NodeConfig, RegistryContainer};
use node_runtime::handlers::serve;

fn init_logging(filter: &str) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_new(filter).context("Invalid log filter")?)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    init_logging(&config.logging.filter)?;

    info!("===========================================");
    info!("  Apostille Ledger Node Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let container = RegistryContainer::new(config).context("Failed to open ledger storage")?;
    let registry = container.registry();

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    info!("Registry is serving on stdin. Press Ctrl+C to stop.");
    tokio::select! {
        served = serve(registry.as_ref(), stdin, stdout) => {
            let answered = served.context("Command loop failed")?;
            info!("Input closed after {} commands", answered);
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            warn!("Interrupted, shutting down");
        }
    }

    info!(
        "Shutdown complete (ledger sequence {})",
        registry.ledger().sequence()
    );
    Ok(())
}
