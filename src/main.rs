//! Agent binary: watch a folder; index, summarize and archive every new file.

use anyhow::Result;
use clap::Parser;
use permagent::cache::EmbeddingCache;
use permagent::embeddings::OpenAIEmbedder;
use permagent::index::spawn_index_worker;
use permagent::ingest::Pipeline;
use permagent::logbook::Logbook;
use permagent::summarize::OpenAISummarizer;
use permagent::upload::LighthouseUploader;
use permagent::watch::run_watcher;
use permagent::Config;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "permagent")]
#[command(about = "Watch a folder; index, summarize and archive every created file")]
struct Args {
    /// Debounce delay in milliseconds before processing a created file
    #[arg(long, default_value = "500")]
    debounce_ms: u64,
}

fn require_env(var: &str, purpose: &str) -> Result<String> {
    std::env::var(var).map_err(|_| {
        anyhow::anyhow!(
            "Environment variable {} not set. Set it in your .env file or as an environment variable with your {} API key.",
            var,
            purpose
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();

    log::info!("Starting Permagent v{}", env!("CARGO_PKG_VERSION"));
    let config = Config::load()?;

    std::fs::create_dir_all(config.watch_folder())?;
    log::info!("Watch folder: {}", config.watch_folder().display());
    log::info!("Success log: {}", config.success_log().display());
    log::info!("Failure log: {}", config.failure_log().display());
    log::info!("Debounce: {} ms", args.debounce_ms);

    let embeddings_key = require_env(&config.embeddings.api_key_env, "OpenAI")?;
    let summarizer_key = require_env(&config.summarizer.api_key_env, "OpenAI")?;
    let storage_key = require_env(&config.storage.api_key_env, "Lighthouse")?;

    // Wrap the embedder in an LRU cache if cache_capacity > 0
    let cache = if config.embeddings.cache_capacity > 0 {
        Some(Arc::new(EmbeddingCache::new(config.embeddings.cache_capacity)))
    } else {
        None
    };

    let embedder = Arc::new(OpenAIEmbedder::new(
        embeddings_key,
        config.embeddings.model.clone(),
        config.embeddings.batch_size,
        Duration::from_secs(config.embeddings.request_timeout_secs),
        cache,
    ));

    let summarizer = Arc::new(OpenAISummarizer::new(
        summarizer_key,
        config.summarizer.model.clone(),
        config.summarizer.max_tokens,
        Duration::from_secs(config.summarizer.request_timeout_secs),
    ));

    let uploader = Arc::new(LighthouseUploader::new(
        config.storage.api_url.clone(),
        storage_key,
        Duration::from_secs(config.storage.request_timeout_secs),
    ));

    let index = spawn_index_worker();
    let logbook = Logbook::new(config.success_log(), config.failure_log());
    let pipeline = Pipeline::new(embedder, index, summarizer, uploader, logbook);

    log::info!("Watching for new files (Ctrl+C to stop)");
    run_watcher(pipeline, config.watch_folder(), args.debounce_ms).await?;

    log::info!("Shutting down");
    Ok(())
}
