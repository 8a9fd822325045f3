pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod services;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub cache: cache::CacheService,
    pub config: config::Config,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
        info!("Database connected");

        db.run_migrations().await?;
        db.ensure_admin(&config.admin).await?;

        let redis = if config.features.enable_cache {
            match redis_client::RedisClient::new(&config.redis.url).await {
                Ok(redis) => {
                    info!("Redis connected");
                    Some(redis)
                }
                Err(e) => {
                    warn!("Redis unavailable, serving without cache: {:?}", e);
                    None
                }
            }
        } else {
            None
        };

        let cache = cache::CacheService::new(redis, db.clone(), config.redis.cache_ttl_seconds);

        Ok(Arc::new(Self { db, cache, config }))
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Marquee Hire API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
