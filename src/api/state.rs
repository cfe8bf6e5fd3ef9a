use std::sync::Arc;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use crate::{
    auth::SessionConfig,
    config::Settings,
    service::ServiceContext,
};

#[derive(Clone)]
pub struct AppState {
    pub service_context: Arc<ServiceContext>,
    pub settings: Arc<Settings>,
    pub session: SessionConfig,
}

impl AppState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        settings: Arc<Settings>,
    ) -> Self {
        let secret = settings.session_secret();
        if secret.is_none() {
            tracing::warn!("No auth.session_secret configured; sessions will not survive a restart");
        }

        let session = SessionConfig::new(
            secret,
            settings.auth.session_duration_hours,
            settings.auth.secure_cookies,
        );

        Self {
            service_context,
            settings,
            session,
        }
    }
}

// Lets handlers and middleware extract `SignedCookieJar` directly.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.session.key.clone()
    }
}
