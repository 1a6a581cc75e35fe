use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing::info;

use dashgate::dashgate_config::ServerConfig;
use dashgate::logging::{init_tracing, shutdown_tracer};
use dashgate::metrics::{init_metrics, metrics_app};
use dashgate::router::init_router;
use dashgate::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Guards flush the file writers on drop
    let _guards = init_tracing();

    let state = init_app_state().await;
    let mut app = init_router(state);

    if let Some(handle) = init_metrics() {
        app = app.merge(metrics_app(handle));
    }

    let addr = ServerConfig::from_env().socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    info!(%addr, "Server running");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Scalar UI available at http://{}/scalar", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    shutdown_tracer();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
