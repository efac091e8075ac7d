use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use confess_api::auth::{AppStateInner, ensure_default_admin};
use confess_db::Database;

const DEV_SECRET: &str = "dev-secret-change-me";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "confess=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret = std::env::var("CONFESS_JWT_SECRET").unwrap_or_else(|_| DEV_SECRET.into());
    if jwt_secret == DEV_SECRET {
        warn!("CONFESS_JWT_SECRET is unset; using the dev placeholder. Do not run this in production.");
    }
    let db_path = std::env::var("CONFESS_DB_PATH").unwrap_or_else(|_| "confess.db".into());
    let host = std::env::var("CONFESS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("CONFESS_PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()?;
    let admin_username =
        std::env::var("CONFESS_ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
    let admin_password =
        std::env::var("CONFESS_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());

    // Init database and the single admin account
    let db = Database::open(&PathBuf::from(&db_path))?;
    ensure_default_admin(&db, &admin_username, &admin_password)?;

    let state = Arc::new(AppStateInner::new(db, jwt_secret));

    let app = confess_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Confession board listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
