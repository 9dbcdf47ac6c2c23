//! Main entry point for the Printssistant backend

use printssistant_backend::{
    api,
    canva::HttpCanvaClient,
    config::Settings,
    db::{create_pool, run_migrations, InMemoryJobStore, JobStore, PgJobStore},
    AppState,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Load configuration
    let settings = Settings::load()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    if settings.logging.format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    }

    info!(
        "Starting Printssistant backend: server={}:{}",
        settings.server.host, settings.server.port
    );

    // Job store
    let jobs: Arc<dyn JobStore> = match settings.database.url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => {
            let pool = create_pool(&settings.database, url).await?;
            if settings.database.run_migrations {
                run_migrations(&pool).await?;
                info!("Database migrations applied");
            }
            Arc::new(PgJobStore::new(pool))
        }
        None => {
            warn!("No database URL configured, jobs are kept in memory and lost on restart");
            Arc::new(InMemoryJobStore::new())
        }
    };

    if settings.canva.webhook_secret.as_deref().unwrap_or_default().is_empty() {
        warn!("No Canva webhook secret configured, webhook signatures are not verified");
    }

    let canva = Arc::new(HttpCanvaClient::new(&settings.canva)?);
    let addr = settings.bind_address();

    // Create application state
    let app_state = Arc::new(AppState::new(settings, jobs, canva));

    // Build the router
    let app = api::routes::create_router(app_state).await;

    info!("Server listening on {}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
