use rest_scaffold::{
    app, ensure_database_exists, ensure_objects_table, logging, AppConfig, AppState,
    CollectorReporter, ErrorReporter, PgObjectRepository, Telemetry,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    logging::init(config.log_level);
    logging::install_panic_hook();

    tracing::info!("Setting up Postgres database connection");
    ensure_database_exists(&config.database.url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    ensure_objects_table(&pool).await?;

    let reporter = config.telemetry.dsn.as_ref().map(|dsn| {
        Arc::new(CollectorReporter::new(dsn.clone(), config.telemetry.flush_timeout)) as Arc<dyn ErrorReporter>
    });
    if reporter.is_none() {
        tracing::info!("TELEMETRY_DSN not set, error reporting disabled");
    }
    let telemetry = Telemetry::new(
        reporter,
        config.telemetry.environment.clone(),
        config.telemetry.flush_timeout,
    );

    let state = AppState::new(Arc::new(PgObjectRepository::new(pool)));
    let router = app(state, telemetry, config.server.limits());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Serving on http://{}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
