//! The `srs-api` binary: wires the HTTP surface (`spec.md` §6) to the
//! engine, store, and task scheduler, following the teacher pack's
//! `main.rs` assembly (`iqrah-backend-api::main`). The handlers, state,
//! and router themselves live in `srs_api`'s library target so
//! integration tests can build the router directly (see `tests/`).

use std::sync::Arc;
use std::time::Duration as StdDuration;

use srs_store::{create_pool, run_migrations, SqliteSrsStore};
use srs_tasks::{TaskScheduler, TaskSchedulerConfig};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use srs_api::clients::{HttpContentGenerator, HttpSemanticGrader};
use srs_api::config::AppConfig;
use srs_api::state::ApiState;
use srs_api::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,sqlx=warn".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(bind_address = %config.bind_address, "starting srs-api");

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    tracing::info!("database migrations complete");

    let store = Arc::new(SqliteSrsStore::new(pool));
    let grader = Arc::new(HttpSemanticGrader::new(config.semantic_grader_url.clone()));
    let generator = Arc::new(HttpContentGenerator::new(config.content_generator_url.clone()));

    let state = Arc::new(ApiState::new(Arc::clone(&store), grader, config.clone()));

    let shutdown = CancellationToken::new();
    let scheduler = TaskScheduler::new(
        store,
        state.clock.clone(),
        generator,
        TaskSchedulerConfig {
            tick_period: config.task_scheduler_tick,
            max_tasks_per_day: config.max_tasks_per_day,
            ..TaskSchedulerConfig::default()
        },
    );
    let scheduler_shutdown = shutdown.clone();
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(scheduler_shutdown).await;
    });

    let app = routes::router(Arc::clone(&state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&state.config.bind_address).await?;
    tracing::info!("listening on {}", state.config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    let _ = tokio::time::timeout(StdDuration::from_secs(5), scheduler_handle).await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
