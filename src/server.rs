//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, worker spawning, and Axum server lifecycle.

use crate::application::services::ClickRecorder;
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::expiry_sweeper::spawn_expiry_sweeper;
use crate::enrichment::{GeoLocator, RequestEnricher, WootheeParser};
use crate::infrastructure::geoip::{HttpGeoLocator, NullGeoLocator};
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use crate::routes::{RateLimitSettings, app_router};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Opens the connection pool, retrying with exponential backoff.
///
/// # Errors
///
/// Returns the last connection error once all attempts failed.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let strategy = ExponentialBackoff::from_millis(250)
        .max_delay(Duration::from_secs(10))
        .map(jitter)
        .take(config.db_connect_retries.saturating_sub(1));

    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let pool = Retry::start(strategy, || {
        let options = options.clone();
        async move {
            options.connect(&config.database_url).await.inspect_err(|e| {
                tracing::warn!(error = %e, "Database connection attempt failed");
            })
        }
    })
    .await
    .context("Failed to connect to database")?;

    Ok(pool)
}

fn geo_locator(config: &Config) -> Arc<dyn GeoLocator> {
    match &config.geoip_api_url {
        Some(url) => {
            match HttpGeoLocator::new(url.clone(), Duration::from_millis(config.geoip_timeout_ms)) {
                Ok(locator) => {
                    tracing::info!("Geolocation enabled ({})", locator.name());
                    Arc::new(locator)
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to build geolocation client: {}. Geolocation disabled.",
                        e
                    );
                    Arc::new(NullGeoLocator::new())
                }
            }
        }
        None => {
            tracing::info!("Geolocation disabled");
            Arc::new(NullGeoLocator::new())
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Geolocation client (or the null locator)
/// - Background click worker and expiry sweeper
/// - Axum HTTP server
///
/// On Ctrl-C or SIGTERM the server stops accepting connections, in-flight
/// requests complete, and the click worker drains its queue before returning.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let click_repository = Arc::new(PgClickRepository::new(pool.clone()));

    let enricher = Arc::new(RequestEnricher::new(
        config.enrichment_config(),
        geo_locator(&config),
        Arc::new(WootheeParser::default()),
    ));
    let recorder = Arc::new(ClickRecorder::new(click_repository.clone()));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(
        click_rx,
        enricher,
        recorder,
        config.click_worker_concurrency,
    ));

    let state = AppState::new(
        link_repository,
        click_repository,
        config.code_generator_config(),
        click_tx,
        config.base_url.clone(),
    );

    let sweeper = spawn_expiry_sweeper(
        state.link_service.clone(),
        config.expiry_sweep_interval_secs,
    );

    let app = app_router(
        state,
        RateLimitSettings {
            per_second: config.rate_limit_per_second,
            burst: config.rate_limit_burst,
        },
    )?;

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    // The router owns the last click sender; dropping it after shutdown
    // closes the channel and lets the worker finish.
    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }

    tracing::info!("Draining click queue");
    if let Err(e) = worker.await {
        tracing::error!("Click worker terminated abnormally: {}", e);
    }

    pool.close().await;
    tracing::info!("Server shut down gracefully");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C received, starting graceful shutdown"),
        _ = terminate => tracing::info!("SIGTERM received, starting graceful shutdown"),
    }
}
