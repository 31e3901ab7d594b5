//! Chapterdesk API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use chapterdesk_core::AppError;
use chapterdesk_infrastructure::InMemoryStore;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, StoreBackend, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{RepositorySet, build_app_state, connect_and_migrate};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let repositories = match &config.store_backend {
        StoreBackend::Postgres { database_url } => {
            let pool = connect_and_migrate(database_url).await?;
            if config.migrate_only {
                info!("database migrations applied successfully");
                return Ok(());
            }
            RepositorySet::postgres(&pool)
        }
        StoreBackend::Memory => {
            warn!("using the in-memory store; data is lost on shutdown");
            RepositorySet::in_memory(Arc::new(InMemoryStore::new()))
        }
    };

    let app_state = build_app_state(repositories, &config).await?;
    let app = build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "chapterdesk-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
