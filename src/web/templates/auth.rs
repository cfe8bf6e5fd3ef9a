use askama::Template;
use axum::{
    extract::{rejection::FormRejection, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::cookie::SignedCookieJar;
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::{
    api::{
        middleware::auth::{login_url, safe_next, CurrentAdmin},
        state::AppState,
    },
    auth::AdminSession,
    error::AppError,
    web::{
        flash::{self, FlashLevel, FlashMessage},
        templates::{HtmlTemplate, PageContext},
    },
};

/// Identical for unknown usernames and wrong passwords.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub form_action: String,
    pub username: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(default)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

fn form_action(next: Option<&str>) -> String {
    match next {
        Some(next) => login_url(next),
        None => "/login".to_string(),
    }
}

// GET /login
pub async fn login_page(
    jar: SignedCookieJar,
    Query(query): Query<LoginQuery>,
) -> Response {
    let (jar, messages) = flash::take(jar);

    let template = LoginTemplate {
        page: PageContext::anonymous(messages),
        form_action: form_action(query.next.as_deref()),
        username: String::new(),
    };

    (jar, HtmlTemplate(template)).into_response()
}

// POST /login
pub async fn login_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(query): Query<LoginQuery>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let now = Utc::now();

    let (credentials, outcome) = match form {
        Ok(Form(credentials)) => {
            // The username is matched exactly as typed.
            let outcome = if credentials.validate().is_err() {
                Ok(None)
            } else {
                state.service_context.auth_service
                    .authenticate(&credentials.username, &credentials.password, now)
                    .await
            };
            (credentials, outcome)
        }
        Err(rejection) => {
            tracing::warn!("Unreadable login form: {}", rejection);
            let message = format!("Invalid input: {}", rejection.body_text());
            (LoginForm::default(), Err(AppError::Validation(message)))
        }
    };

    let failure = match outcome {
        Ok(Some(admin)) => {
            tracing::info!("Admin {} logged in", admin.username);

            let jar = AdminSession::new(&admin, now).store(jar, &state.session);
            let jar = flash::push(jar, FlashLevel::Success, "Login successful!");
            let target = safe_next(query.next.as_deref()).to_string();

            return (jar, Redirect::to(&target)).into_response();
        }
        Ok(None) => {
            tracing::warn!("Failed login attempt for username {:?}", credentials.username);
            INVALID_CREDENTIALS.to_string()
        }
        Err(AppError::Validation(message)) => message,
        Err(e) => {
            tracing::error!("Login lookup failed: {}", e);
            format!("Error during login: {}", e)
        }
    };

    // Re-render the form in place (HTTP 200) rather than redirecting.
    let (jar, mut messages) = flash::take(jar);
    messages.push(FlashMessage::new(FlashLevel::Danger, failure));

    let template = LoginTemplate {
        page: PageContext::anonymous(messages),
        form_action: form_action(query.next.as_deref()),
        username: credentials.username,
    };

    (jar, HtmlTemplate(template)).into_response()
}

// GET|POST /logout
pub async fn logout_handler(
    Extension(current_admin): Extension<CurrentAdmin>,
    jar: SignedCookieJar,
) -> Response {
    tracing::info!("Admin {} logged out", current_admin.session.username);

    let jar = AdminSession::clear(jar);
    let jar = flash::clear(jar);
    let jar = flash::push(jar, FlashLevel::Success, "You have been logged out");

    (jar, Redirect::to("/login")).into_response()
}
