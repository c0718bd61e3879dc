use std::net::SocketAddr;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use transfer_dashboard::{load_dataset, quality, router, AppState, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let settings = Settings::from_env();
    let dataset = load_dataset(settings.data_path.as_deref()).await;
    info!(
        months = dataset.monthly.len(),
        slots = dataset.hourly.len(),
        countries = dataset.countries.len(),
        clients = dataset.clients.len(),
        failure_reasons = dataset.failures.len(),
        "dataset ready"
    );

    for warning in quality::audit(&dataset, settings.share_tolerance) {
        warn!(set = %warning.set, kind = ?warning.kind, "{}", warning.detail);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let app = router(AppState::new(dataset, settings));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
