//! echoic-server - pronunciation practice service
//!
//! Users keep a library of songs with lyrics, record themselves singing or
//! speaking a lyric line, and get a similarity score plus feedback comparing
//! the recognized transcript with the expected line.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use echoic_common::config::{
    load_module_config, CompiledDefaults, RootFolderInitializer, RootFolderResolver,
};
use echoic_server::services::{GoogleSpeechRecognizer, PronunciationPipeline, RecognizerConfig};
use echoic_server::AppState;

const MODULE_NAME: &str = "echoic-server";

#[derive(Parser, Debug)]
#[command(name = "echoic-server", version, about = "Pronunciation practice service")]
struct Cli {
    /// Root folder holding the database, uploads and recordings
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5740
    #[arg(long, env = "ECHOIC_BIND")]
    bind: Option<String>,

    /// Explicit TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_module_config(MODULE_NAME, cli.config.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting echoic-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let defaults = CompiledDefaults::for_current_platform();

    // Root folder: CLI > env > TOML > compiled default
    let root_folder = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(cli.root_folder.clone())
        .with_config(config.clone())
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = echoic_common::db::init_database(&db_path).await?;

    let recognizer_config =
        RecognizerConfig::from_settings(&config.recognizer, config.recognizer_api_key());
    let recognizer = GoogleSpeechRecognizer::new(&recognizer_config)
        .map_err(|e| anyhow::anyhow!("Failed to create speech recognizer: {}", e))?;
    info!(
        endpoint = %recognizer_config.endpoint,
        api_key = recognizer_config.has_api_key(),
        "Speech recognizer configured"
    );
    let pipeline = PronunciationPipeline::new(Arc::new(recognizer), &recognizer_config);

    let max_upload_bytes = config
        .max_upload_bytes
        .unwrap_or(defaults.max_upload_bytes);

    let state = AppState::new(
        db_pool,
        pipeline,
        initializer.uploads_path(),
        initializer.recordings_path(),
        max_upload_bytes,
    );
    let app = echoic_server::build_router(state);

    let bind_address = cli
        .bind
        .or(config.bind_address)
        .unwrap_or(defaults.bind_address);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
