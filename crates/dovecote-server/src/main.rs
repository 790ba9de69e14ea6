use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use dovecote_api::routes::{self, AppState};
use dovecote_db::Database;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dovecote=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret = std::env::var("DOVECOTE_JWT_SECRET").unwrap_or_default();
    if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
        eprintln!("FATAL: DOVECOTE_JWT_SECRET is unset or still a placeholder.");
        eprintln!("       It must match the secret the auth service signs tokens with.");
        eprintln!("       Set it in your .env file and restart.");
        std::process::exit(1);
    }

    let db_path = std::env::var("DOVECOTE_DB_PATH").unwrap_or_else(|_| "dovecote.db".into());
    let host = std::env::var("DOVECOTE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("DOVECOTE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = Arc::new(Database::open(&PathBuf::from(&db_path))?);

    // Optional bootstrap for fresh installs: DOVECOTE_SEED_CREATOR=company_id:handle
    if let Ok(raw) = std::env::var("DOVECOTE_SEED_CREATOR") {
        seed_creator(&db, &raw)?;
    }

    let state = AppState { db, jwt_secret };

    let app = routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Dovecote API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Create the creator record for a company unless one already exists.
fn seed_creator(db: &Database, raw: &str) -> anyhow::Result<()> {
    let (company_id, handle) = raw.split_once(':').ok_or_else(|| {
        anyhow::anyhow!("DOVECOTE_SEED_CREATOR must look like 'company_id:handle'")
    })?;

    if db.get_creator_by_company(company_id)?.is_some() {
        return Ok(());
    }

    let id = Uuid::new_v4();
    db.create_creator(&id.to_string(), company_id, handle)?;
    info!("Seeded creator '{}' for company '{}'", handle, company_id);

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
