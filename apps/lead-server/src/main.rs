//! Lead Server binary.

use lead_server::{
    config::{Config, StoreBackend},
    init_tracing, serve,
};
use lead_store::{MemoryLeadStore, SqliteLeadStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    init_tracing(&config.log_level);

    match config.store_backend() {
        StoreBackend::Memory => {
            tracing::info!("Starting Lead Server with in-memory store");
            serve(config, MemoryLeadStore::new()).await
        }
        StoreBackend::Sqlite(url) => {
            tracing::info!(database_url = %url, "Starting Lead Server with SQLite store");
            let store = SqliteLeadStore::connect(&url).await?;
            serve(config, store).await
        }
    }
}
