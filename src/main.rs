use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_hire::{
    app,
    config::{Config, LogFormat},
    services::completion::CompletionService,
    AppState,
};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let filter = tracing_subscriber::EnvFilter::new(&config.app.rust_log);
    match config.app.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }

    info!("Starting Marquee Hire API ({})", config.app.environment);

    let app_state = AppState::new(config.clone()).await?;
    app_state.cache.warmup_cache().await;

    // --- Background tasks ---

    // Confirmed bookings whose event has ended become completed
    CompletionService::new(app_state.clone())
        .spawn(Duration::from_secs(config.booking.completion_sweep_seconds.max(60)));

    // --- Web server ---

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(app_state).into_make_service()).await?;
    Ok(())
}
