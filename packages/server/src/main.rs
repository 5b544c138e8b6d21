use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use asset_server::config::AppConfig;
use asset_server::state::AppState;
use asset_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("failed to initialize database")?;

    seed::seed_role_permissions(&db)
        .await
        .context("failed to seed roles")?;
    seed::ensure_indexes(&db).await?;
    seed::seed_bootstrap_admin(&db, config.auth.bootstrap_admin.as_ref())
        .await
        .context("failed to seed bootstrap admin")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server.host / server.port")?;

    let app = build_router(AppState { db, config });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Asset server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
