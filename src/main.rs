use std::time::Duration;

use gatehouse::config::{AppConfig, BuildMode};
use gatehouse::router::{RouterConfig, create_router};
use gatehouse::{auth, server, telemetry};

const QUERY_GC_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let build_mode = BuildMode::from_env()?;
    telemetry::init(build_mode);

    let config = AppConfig::from_env()?;
    let auth_provider = auth::provider_from_config(config.auth.as_ref());
    let router = create_router(&RouterConfig::from_app_config(&config, auth_provider))?;

    // Eviction sweep lives exactly as long as the server.
    let gc = router.query_client().spawn_gc_task(QUERY_GC_INTERVAL);

    let app = server::app(router, &config.assets_dir);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

    tracing::info!(port = config.port, build_mode = build_mode.as_str(), "gatehouse listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    gc.abort();
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "ctrl-c handler failed");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "SIGTERM handler failed"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
