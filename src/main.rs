use anyhow::Result;
use axum::{routing::get, Router};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::{env, net::SocketAddr};

mod config;
mod error;
mod estimator;
mod grouping;
mod merge;
mod models;
mod prediction;
mod routes;
mod service;
mod stats;
mod store;

use config::CycleConfig;
use service::CycleService;
use store::PgCycleStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let service = CycleService::new(PgCycleStore::new(pool), CycleConfig::default());

    let app = Router::new()
        .merge(routes::cycles::routes(service.clone()))
        .merge(routes::status::routes(service.clone()))
        .merge(routes::stats::routes(service))
        .route("/health", get(|| async { "✅ Backend up" }));

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3050);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("🩸 Cycle tracking server running at {}", addr);

    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}
