mod availability;
mod cache;
mod config;
mod db;
mod entities;
mod error;
mod fetch;
mod models;
mod routes;
mod scheduler;
mod tmdb;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{cache::CatalogCache, config::Config, tmdb::TmdbClient};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tmdb: Arc<TmdbClient>,
    pub cache: CatalogCache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,marquee=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let http = reqwest::Client::builder().user_agent("marquee/0.1").build()?;

    let db = db::connect_and_migrate(config.database_url.as_str()).await?;
    let tmdb = Arc::new(TmdbClient::new(http, &config.tmdb));
    let cache = CatalogCache::new(db.clone(), tmdb.clone());

    let state = Arc::new(AppState { db, tmdb, cache });

    let app = routes::router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
