use anyhow::Result;

use taxograph::config::AppConfig;
use taxograph::model::Collection;
use taxograph::store::{AdminStore, PostgresStore};

/// One-shot maintenance command: drop all seven backing collections.
/// Not part of the live API surface.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let Some(database_url) = config.database_url() else {
        println!("No database configured; the in-memory store has nothing to drop.");
        return Ok(());
    };

    println!("Connecting to PostgreSQL...");
    let store = PostgresStore::new(&database_url).await?;

    for collection in Collection::ALL {
        store.drop_collection(collection).await?;
        println!("Dropped {}", collection);
    }

    println!("All collections dropped.");

    Ok(())
}
