use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::cache::{CacheError, ResultCache};
use common::cache::memory::MemoryCache;
use common::cache::redis::RedisCache;
use common::config::{CacheBackend, CacheConfig, StorageBackend, StorageConfig};
use common::storage::BlobStore;
use common::storage::filesystem::FilesystemBlobStore;
use common::storage::s3::S3BlobStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use textvault::config::AppConfig;
use textvault::database::init_db;
use textvault::paste::{PasteService, PasteServiceContext, SeaOrmMetadataStore};
use textvault::state::AppState;
use textvault::utils::jwt::JwtKeys;

async fn init_blob_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.backend {
        StorageBackend::Filesystem => Arc::new(
            FilesystemBlobStore::new(config.path.clone(), config.max_blob_size)
                .await
                .context("Failed to initialize filesystem blob store")?,
        ),
        StorageBackend::S3 => Arc::new(
            S3BlobStore::new(&config.s3, config.max_blob_size)
                .context("Failed to initialize S3 blob store")?,
        ),
    };
    info!(backend = ?config.backend, "Blob store ready");
    Ok(store)
}

/// The cache is never authoritative, so an unreachable Redis only costs speed.
async fn init_cache(config: &CacheConfig) -> Option<Arc<dyn ResultCache>> {
    match config.backend {
        CacheBackend::Redis => match connect_redis(&config.url).await {
            Ok(cache) => {
                info!("Connected to Redis cache");
                Some(Arc::new(cache))
            }
            Err(e) => {
                warn!(error = %e, "Redis unavailable, serving without a cache");
                None
            }
        },
        CacheBackend::Memory => {
            info!(capacity = config.capacity, "Using in-process cache");
            Some(Arc::new(MemoryCache::new(config.capacity)))
        }
        CacheBackend::Disabled => None,
    }
}

async fn connect_redis(url: &str) -> Result<RedisCache, CacheError> {
    let cache = RedisCache::connect(url).await?;
    cache.ping().await?;
    Ok(cache)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Arc::new(AppConfig::load().context("Failed to load config")?);

    let db = init_db(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Database ready");

    let blobs = init_blob_store(&config.storage).await?;
    let token_ttl = config.auth.token_ttl().context("Invalid auth config")?;
    let jwt = Arc::new(JwtKeys::new(&config.auth.jwt_secret, token_ttl));

    let ctx = PasteServiceContext {
        store_timeout: config.paste.store_timeout(),
        cache_timeout: config.cache.timeout(),
        cache_ttl: config.cache.ttl(),
    };
    let mut pastes = PasteService::new(
        ctx,
        Arc::new(SeaOrmMetadataStore::new(db.clone())),
        blobs,
        jwt.clone(),
    );
    if let Some(cache) = init_cache(&config.cache).await {
        pastes = pastes.with_cache(cache);
    }

    let state = AppState {
        db,
        config: config.clone(),
        pastes: Arc::new(pastes),
        jwt,
    };
    let app = textvault::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
