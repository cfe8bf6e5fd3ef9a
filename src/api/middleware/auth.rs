use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use chrono::Utc;

use crate::{
    api::state::AppState,
    auth::AdminSession,
    web::flash::{self, FlashLevel},
};

/// The authenticated administrator, inserted into request extensions by [`require_admin_session`].
#[derive(Clone)]
pub struct CurrentAdmin {
    pub session: AdminSession,
}

/// Gate for every dashboard route. Requests without a valid session are sent to the
/// login page with the requested path in `next`.
pub async fn require_admin_session(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(session) = AdminSession::from_jar(&jar, &state.session, Utc::now()) {
        request.extensions_mut().insert(CurrentAdmin { session });
        return next.run(request).await;
    }

    let requested = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    tracing::debug!("Unauthenticated request for {}, redirecting to login", requested);

    // Drop any stale or tampered session cookie along the way.
    let jar = AdminSession::clear(jar);
    let jar = flash::push(jar, FlashLevel::Warning, "Please log in to access this page");

    (jar, Redirect::to(&login_url(&requested))).into_response()
}

/// `/login?next=<requested>`, with the path percent-encoded.
pub fn login_url(requested: &str) -> String {
    match serde_urlencoded::to_string([("next", requested)]) {
        Ok(query) => format!("/login?{}", query),
        Err(_) => "/login".to_string(),
    }
}

/// Only local absolute paths that fit in a `Location` header are followed after login;
/// anything else goes to the dashboard.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => "/",
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
        && HeaderValue::from_str(path).is_ok()
}
