use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use axum_extra::extract::cookie::SignedCookieJar;
use chrono::Utc;

use crate::{
    api::{middleware::auth::CurrentAdmin, state::AppState},
    error::AppError,
    web::{
        flash::{self, FlashLevel},
        templates::{HtmlTemplate, PageContext},
    },
};
use super::{admin_page, MemberRowView, PlanView};

#[derive(Template)]
#[template(path = "plans/members.html")]
pub struct PlanMembersTemplate {
    pub page: PageContext,
    pub plan: PlanView,
    pub members: Vec<MemberRowView>,
}

// GET /members_by_plan/:plan_id
pub async fn members_by_plan(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    Path(plan_id): Path<String>,
    jar: SignedCookieJar,
) -> Response {
    let outcome = match plan_id.trim().parse::<i64>() {
        Ok(id) => state.service_context.member_service.members_by_plan(id).await,
        Err(_) => Err(AppError::NotFound("Plan not found".to_string())),
    };

    let roster = match outcome {
        Ok(roster) => roster,
        Err(e) => {
            let text = match e {
                AppError::NotFound(_) => "Plan not found".to_string(),
                other => {
                    tracing::error!("Failed to load members for plan {}: {}", plan_id, other);
                    format!("Error loading members: {}", other)
                }
            };
            let jar = flash::push(jar, FlashLevel::Danger, text);
            return (jar, Redirect::to("/")).into_response();
        }
    };

    let now = Utc::now();
    let (jar, messages) = flash::take(jar);
    let template = PlanMembersTemplate {
        page: admin_page(&current_admin, messages),
        members: roster
            .members
            .iter()
            .map(|m| MemberRowView::new(m, &roster.plan.plan_name, now))
            .collect(),
        plan: PlanView::from(&roster.plan),
    };

    (jar, HtmlTemplate(template)).into_response()
}
