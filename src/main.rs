use content_search::app::build_router;
use content_search::auth::AuthConfig;
use content_search::cache::gateway::CacheGateway;
use content_search::cache::memory::MemoryCache;
use content_search::config::ServiceConfig;
use content_search::ingestion::indexer::Indexer;
use content_search::search::engine::SearchEngine;
use content_search::storage::memory::MemoryDocumentStore;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = ServiceConfig::from_env();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = config.apply_args(&args) {
        eprintln!("{}", e);
        eprintln!("Usage: {} [--bind <addr:port>]", env!("CARGO_PKG_NAME"));
        std::process::exit(1);
    }

    // 1. Document store + indexes:
    let store = Arc::new(MemoryDocumentStore::new());
    let indexer = Arc::new(Indexer::new(store.clone()));
    indexer.ensure_indexes().await;

    // 2. Response cache:
    let cache_backend = Arc::new(MemoryCache::new());
    let cache = if config.cache_enabled {
        tracing::info!(
            "Response cache enabled (results ttl {:?}, trending ttl {:?})",
            config.cache.results_ttl,
            config.cache.trending_ttl
        );
        CacheGateway::new(cache_backend.clone(), config.cache)
    } else {
        tracing::warn!("Response cache disabled");
        CacheGateway::disabled()
    };

    let engine = Arc::new(SearchEngine::with_page_limits(
        store.clone(),
        cache,
        config.page_limits,
    ));

    let auth = Arc::new(AuthConfig {
        service_api_key: config.service_api_key.clone(),
        jwt_secret: config.jwt_secret.clone(),
    });

    // 3. HTTP Router:
    let app = build_router(engine, indexer, auth);

    // 4. Spawn stats reporter:
    let stats_store = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));

        loop {
            interval.tick().await;
            tracing::info!(
                "Index stats: {} documents, {} cached responses",
                stats_store.document_count(),
                cache_backend.len()
            );
        }
    });

    // 5. Start HTTP server:
    tracing::info!("Search service listening on {}", config.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
