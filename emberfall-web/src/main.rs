use emberfall_core::catalog;
use emberfall_core::{Config, GameStore};
use emberfall_web::api::{start_api_server, ApiState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    let mut store = GameStore::open(config.store_path()).await;
    let seeded = catalog::ensure_classes(&mut store);
    if seeded > 0 {
        tracing::info!(count = seeded, "seeded starter classes");
        store.save().await?;
    }

    let state = ApiState::new(store, &config);
    start_api_server(state, &config.bind_addr).await
}
