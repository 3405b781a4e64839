//! Inkly API Server Binary

use clap::Parser;
use inkly::api::ApiServer;
use inkly::{ConfigLoader, GameManager, GeminiClassifier};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "inkly")]
#[command(about = "Inkly drawing game server", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// API server host (overrides config and INKLY_HOST)
    #[arg(long)]
    host: Option<String>,

    /// API server port (overrides config and INKLY_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Seed for prompt selection, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Create unknown players on their first session instead of rejecting them
    #[arg(long)]
    auto_provision: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkly=info,tower_http=info".into()),
        )
        .init();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(seed) = args.seed {
        config.game.rng_seed = Some(seed);
    }
    if args.auto_provision {
        config.game.auto_provision_players = true;
    }
    loader.validate(&config)?;

    if args.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let manager = Arc::new(GameManager::in_memory(config.game.clone()));
    let classifier = Arc::new(GeminiClassifier::new(&config.classifier));
    info!(has_api_key = classifier.has_api_key(), model = %config.classifier.model, "Classifier ready");

    ApiServer::new(config, manager, classifier).run().await
}
