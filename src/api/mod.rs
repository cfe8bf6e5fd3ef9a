pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::get,
};
use tower_http::{
    compression::CompressionLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use state::AppState;

/// The complete application: health probe, static assets and the dashboard pages.
pub fn create_app(app_state: AppState) -> Router {
    let static_dir = ServeDir::new(&app_state.settings.server.static_dir);

    Router::new()
        .route("/health", get(handlers::root::health_check))

        // Dashboard pages (login, members, plans)
        .merge(crate::web::create_web_routes(app_state.clone()))

        .nest_service("/static", static_dir)

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
