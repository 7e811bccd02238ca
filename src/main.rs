use dotenvy::dotenv;
use safiwash::{
    api::{AppState, router},
    config::{catalog, database, settings::Settings},
    core::service,
    errors::Result,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Runtime settings
    let settings = Settings::from_env()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;
    info!(
        "Starting SafiWash on {} with {:?} reward policy",
        settings.bind_addr, settings.reward_policy
    );

    // 4. Database and schema
    database::ensure_database_dir(&settings.database_url)?;
    let db = database::create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Seed the service catalog into an empty database
    let catalog = catalog::load_catalog(&settings.catalog_path)?;
    service::seed_services(&db, &catalog)
        .await
        .inspect_err(|e| error!("Failed to seed services: {e}"))?;

    // 6. Serve until Ctrl-C
    let listener = TcpListener::bind(settings.bind_addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    let app = router(AppState::new(db, settings));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}
