use order_relay::config::RelayConfig;
use order_relay::lifecycle::{setup_tracing, RelaySystem, StartupError};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    setup_tracing();

    let config =
        RelayConfig::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;
    info!(?config, "Starting order relay");

    let system = RelaySystem::start(&config).await?;
    let app = system.app();

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = system.shutdown().await {
        error!(error = %e, "Shutdown incomplete");
    }
    info!("Order relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
