//! Management command: wipe and reseed the item catalog.
//!
//! Usage: `populate_items`. Reads `EMBERFALL_*` from the environment.

use emberfall_core::{catalog, Config, GameStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    let mut store = GameStore::open(config.store_path()).await;

    let classes = catalog::ensure_classes(&mut store);
    let summary = catalog::populate(&mut store)?;
    store.save().await?;

    if classes > 0 {
        println!("Seeded {classes} starter classes");
    }
    println!("Catalog populated: {summary}");
    Ok(())
}
