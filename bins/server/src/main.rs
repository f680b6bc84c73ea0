//! JobLedger API server.
//!
//! Loads configuration, connects to Postgres and serves the HTTP API. If the
//! schema is behind, the server still starts but answers every request with
//! 503 until the migrator has been run.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use jobledger_api::{AppState, SchemaStatus, create_router};
use jobledger_db::{connect, pending_migrations};
use jobledger_shared::{AppConfig, EmailService, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(config.server.json_logs);

    let db = connect(&config.database)
        .await
        .context("failed to connect to database")?;
    info!(max_connections = config.database.max_connections, "Connected to database");

    let pending = pending_migrations(&db)
        .await
        .context("failed to read migration status")?;
    if !pending.is_empty() {
        warn!(
            pending = ?pending,
            "Database schema is out of date; serving 503 until migrations are applied"
        );
    }

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60)
            .context("jwt.access_token_expiry_secs is too large")?,
    });

    let email_service = EmailService::new(config.email.clone());
    info!(
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email service configured"
    );

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        email_service: Arc::new(email_service),
        reports: Arc::new(config.reports.clone()),
        schema: SchemaStatus::new(pending),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jobledger=debug,jobledger_api=debug,jobledger_db=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
