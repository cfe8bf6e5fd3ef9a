pub mod auth;

use askama::Template;
use axum::{
    response::{Html, IntoResponse, Response},
    http::StatusCode,
};

use crate::web::flash::FlashMessage;

/// Data every page layout needs: who is logged in and the pending flash messages.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub logged_in: bool,
    pub admin_name: String,
    pub messages: Vec<FlashMessage>,
}

impl PageContext {
    pub fn anonymous(messages: Vec<FlashMessage>) -> Self {
        Self {
            logged_in: false,
            admin_name: String::new(),
            messages,
        }
    }

    pub fn for_admin(admin_name: &str, messages: Vec<FlashMessage>) -> Self {
        Self {
            logged_in: true,
            admin_name: admin_name.to_string(),
            messages,
        }
    }
}

// Make askama templates work with axum
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!("Failed to render template: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template: {}", err),
                ).into_response()
            }
        }
    }
}
