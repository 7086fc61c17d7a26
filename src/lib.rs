pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod seed;
pub mod services;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

// Shared state for every request handler
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
    pub bookings: services::booking::BookingService,
}

impl AppState {
    /// Connects to the configured database, applies migrations and loads the
    /// sample catalogue when enabled.
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
        info!("Database connected");

        db.run_migrations().await?;

        if config.features.seed_sample_data {
            let report = seed::seed_sample_data(&db, &config.seed.retired_titles).await?;
            info!(
                "Seed finished: {} movies, {} retired, {} new showtimes",
                report.movies_upserted, report.movies_retired, report.showtimes_created
            );
        }

        Ok(Self::with_database(db, config))
    }

    /// State over an already prepared database.
    pub fn with_database(db: database::Database, config: config::Config) -> Arc<Self> {
        let bookings = services::booking::BookingService::new(db.clone());
        Arc::new(Self {
            db,
            config,
            bookings,
        })
    }
}

/// Full application router: JSON API under `/api`, health probes, and the
/// static site when a directory is configured.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes());

    match state.config.features.static_dir.clone() {
        Some(dir) => {
            info!("Serving static files from {}", dir.display());
            app = app.fallback_service(ServeDir::new(dir));
        }
        None => {
            app = app.route("/", get(|| async { "Cinema Booking API v1.0" }));
        }
    }

    app.with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
