use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use vidya_core::{Config, TutorContext};
use vidya_gateway::{GatewayServer, TtsClient};
use vidya_index::DocumentStore;
use vidya_llm::any::AnyProvider;
use vidya_llm::gemini::GeminiProvider;
use vidya_memory::TurnStore;

#[derive(Parser)]
#[command(name = "vidya", version, about = "Multilingual AI tutoring backend")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "vidya.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    if config.llm.api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; generation requests will fail");
    }

    let documents = DocumentStore::load(Path::new(&config.lessons.dir));

    let turns = open_turn_store(&config.memory.sqlite_path).await;

    let provider = AnyProvider::Gemini(GeminiProvider::new(
        config.llm.api_key.clone(),
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        config.llm.max_output_tokens,
    ));

    let ctx = Arc::new(TutorContext::new(provider, documents, turns));
    let tts = TtsClient::new(config.tts.base_url.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    GatewayServer::new(
        &config.gateway.bind,
        config.gateway.port,
        ctx,
        tts,
        shutdown_rx,
    )
    .with_rate_limit(config.gateway.rate_limit)
    .with_max_body_size(config.gateway.max_body_size)
    .serve()
    .await
    .context("gateway server failed")?;

    Ok(())
}

/// Chat turns are persisted best-effort: a broken database disables
/// persistence instead of refusing to start.
async fn open_turn_store(sqlite_path: &str) -> Option<TurnStore> {
    if sqlite_path != ":memory:"
        && let Some(parent) = Path::new(sqlite_path).parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        tracing::warn!("cannot create data directory {}: {e}", parent.display());
    }

    match TurnStore::new(sqlite_path).await {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!("chat turn persistence disabled: {e}");
            None
        }
    }
}
