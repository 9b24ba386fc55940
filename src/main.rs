//! DevEvent - event listing and booking service
//!
//! Serves the JSON API and the server-rendered pages over a PostgreSQL store.

use std::sync::Arc;

use devevent::{
    api::AppState,
    config::Config,
    db::{Database, PgBookingRepository, PgEventRepository},
    error::Result,
    logging,
    service::EventService,
    upload::LocalImageStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment; a missing DATABASE_URL is fatal here
    let config = Arc::new(Config::from_env()?);

    config.validate()?;

    logging::init_tracing(&config.server)?;

    // Log configuration (with sensitive data masked)
    config.log_config();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting DevEvent");

    // Opened lazily by the first repository call
    let database = Arc::new(Database::from_config(config.database.clone()));

    let service = EventService::new(
        Arc::new(PgEventRepository::new(database.clone())),
        Arc::new(PgBookingRepository::new(database.clone())),
    );
    let images = Arc::new(LocalImageStore::from_config(&config.upload));

    let state =
        AppState::new(service, images).with_error_details(config.server.is_development());

    // Warm the connection so migrations run before traffic arrives
    if let Err(e) = database.ensure_connection().await {
        tracing::warn!(error = %e, "Database not reachable at startup, will retry on demand");
    }

    devevent::create_server(state, config).await?;

    tracing::info!("DevEvent shutdown complete");
    Ok(())
}
