use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gymdesk::{
    api::{self, state::AppState},
    config::Settings,
    db,
    service::{seed_service::ensure_seed_data, ServiceContext},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gymdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting gymdesk on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = db::connect(&settings.database.url, settings.database.max_connections).await?;
    db::run_migrations(&db_pool).await?;

    let service_context = Arc::new(ServiceContext::new(db_pool));

    // Plans and the default admin are only inserted into empty tables
    let report = ensure_seed_data(&service_context, &settings.admin).await?;
    tracing::debug!("Seed check: {:?}", report);

    let settings = Arc::new(settings);
    let app = api::create_app(AppState::new(service_context, settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
