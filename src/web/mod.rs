pub mod flash;
pub mod portal;
pub mod templates;

use axum::{
    Router,
    routing::get,
};
use crate::api::state::AppState;

/// Login pages plus the session-gated dashboard.
pub fn create_web_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(templates::auth::login_page).post(templates::auth::login_handler),
        )
        .merge(portal::create_portal_routes(state))
}
