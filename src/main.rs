use anyhow::Context;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coach_reservation::{
    config::{Config, LogFormat},
    controllers, AppState,
};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("invalid configuration")?;

    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log));
    match config.app.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    info!("Starting Coach Reservation API");

    // Хранилище, кеш и засев мест
    let app_state = AppState::new(&config)
        .await
        .context("failed to initialise application state")?;
    info!(
        "Coach layout: {} rows, {} seats",
        config.coach.layout().row_count(),
        config.coach.layout().total_seats()
    );

    let app = controllers::app(app_state);

    let ip = config
        .app
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("HOST '{}' is not a valid IP address", config.app.host))?;
    let addr = SocketAddr::new(ip, config.app.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;

    Ok(())
}
