use std::net::SocketAddr;
use std::sync::Arc;

use movequote_api::{app, AppState};
use movequote_pricing::PricingConfig;
use movequote_store::{app_config::Config, DbClient, StoreEstimateRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "movequote_api=debug,movequote_order=debug,movequote_pricing=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting movequote API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections).await?;
    if config.database.run_migrations {
        db.migrate().await?;
    }

    let repo = Arc::new(StoreEstimateRepository::new(db.pool.clone()));
    let pricing = PricingConfig {
        price_per_km: config.pricing.price_per_km,
    };
    let app = app(AppState::new(repo, pricing));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
