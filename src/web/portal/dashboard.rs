use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::cookie::SignedCookieJar;
use chrono::Utc;

use crate::{
    api::{middleware::auth::CurrentAdmin, state::AppState},
    service::DashboardData,
    web::{
        flash::{self, FlashLevel, FlashMessage},
        templates::{HtmlTemplate, PageContext},
    },
};
use super::{admin_page, format_date, MemberRowView, PlanNames, PlanView};

#[derive(Template)]
#[template(path = "dashboard/index.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub members: Vec<MemberRowView>,
    pub expired: Vec<MemberRowView>,
    pub plans: Vec<PlanView>,
    pub today: String,
}

// GET /
pub async fn dashboard_page(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    jar: SignedCookieJar,
) -> Response {
    let now = Utc::now();
    let (jar, mut messages) = flash::take(jar);

    // A failed load still renders the page, just with empty tables.
    let data = match state.service_context.member_service.dashboard(now).await {
        Ok(data) => data,
        Err(e) => {
            tracing::error!("Failed to load dashboard: {}", e);
            messages.push(FlashMessage::new(FlashLevel::Danger, format!("Error loading data: {}", e)));
            DashboardData::default()
        }
    };

    let names = PlanNames::new(&data.plans);
    let rows = |members: &[crate::domain::Member]| -> Vec<MemberRowView> {
        members
            .iter()
            .map(|m| MemberRowView::new(m, names.name(m.subscription.plan_id), now))
            .collect()
    };

    let template = DashboardTemplate {
        page: admin_page(&current_admin, messages),
        members: rows(&data.members),
        expired: rows(&data.expired),
        plans: data.plans.iter().map(PlanView::from).collect(),
        today: format_date(now),
    };

    (jar, HtmlTemplate(template)).into_response()
}
