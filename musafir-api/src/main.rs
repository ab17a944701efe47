use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use musafir_api::{app, AppState};
use musafir_booking::BookingEngine;
use musafir_store::{
    DbClient, StoreInventoryAuditLog, StoreReservationRepository, StoreRoomTypeRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "musafir_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = musafir_store::app_config::Config::load()?;
    tracing::info!("Starting Musafir API on port {}", config.server.port);

    let db = DbClient::with_options(
        &config.database.url,
        config.database.max_connections,
        Duration::from_secs(config.database.acquire_timeout_secs),
    )
    .await?;
    db.migrate().await?;

    let reservations = Arc::new(StoreReservationRepository::new(db.pool.clone()));
    let engine = Arc::new(BookingEngine::new(reservations));

    // Live inventory events for SSE subscribers
    let (events_tx, _) = tokio::sync::broadcast::channel(100);

    let app_state = AppState {
        engine,
        catalog: Arc::new(StoreRoomTypeRepository::new(db.pool.clone())),
        audit_log: Arc::new(StoreInventoryAuditLog::new(db.pool.clone())),
        events_tx,
        booking_rules: config.booking_rules.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
