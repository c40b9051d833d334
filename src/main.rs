use axum::serve;
use std::sync::Arc;
use taxograph::api::routes::create_router;
use taxograph::config::AppConfig;
use taxograph::seed;
use taxograph::store::{MemoryStore, PostgresStore, Store};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    println!("taxograph: Taxonomy Graph CRUD Server");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}",
        config.server.host, config.server.port
    );

    match config.database_url() {
        Some(database_url) => {
            println!("Connecting to PostgreSQL...");
            let store = PostgresStore::new(&database_url).await?;

            println!("Running database migrations...");
            store.migrate().await?;
            println!("Database ready with one table per collection");

            boot(store, &config).await
        }
        None => {
            log::warn!("no database configured; documents will not survive a restart");
            boot(MemoryStore::new(), &config).await
        }
    }
}

async fn boot<S: Store + 'static>(store: S, config: &AppConfig) -> anyhow::Result<()> {
    let store = Arc::new(store);

    // Load seed data for demonstration (optional)
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        println!("Loading seed data...");
        seed::load_seed_data(&*store).await?;
        println!("Seed data loaded successfully");
    }

    run_server(create_router().with_state(store), config).await
}

async fn run_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("taxograph server running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
