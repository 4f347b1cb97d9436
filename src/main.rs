use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use weekflow::{load_data, router, spawn_rollover_ticker, AppState, Config, LocalClock};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();

    let clock = Arc::new(LocalClock);
    let data = load_data(&config.data_path, clock.as_ref()).await;
    info!(
        path = %config.data_path.display(),
        total_xp = data.total_xp,
        last_reset = %data.last_reset,
        "loaded state"
    );
    let state = AppState::new(config.data_path.clone(), data, clock);

    let ticker = spawn_rollover_ticker(state.clone(), config.rollover_interval);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ticker.abort();
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
