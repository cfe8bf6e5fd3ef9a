use askama::Template;
use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::cookie::SignedCookieJar;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentAdmin, state::AppState},
    domain::{
        non_blank, parse_form_date, parse_form_int, CreateMemberRequest, UpdateSubscriptionRequest,
    },
    error::{AppError, Result},
    service::MemberDetail,
    web::{
        flash::{self, FlashLevel},
        templates::{HtmlTemplate, PageContext},
    },
};
use super::{admin_page, format_date, plan_badge_class};

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AddMemberForm {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub age: String,
    #[validate(length(min = 1, message = "contact is required"))]
    pub contact: String,
    pub plan: String,
    pub payment_method: String,
    pub start_date: String,
    pub expiry_date: String,
    pub email: String,
    pub address: String,
    pub emergency_contact: String,
    pub health_notes: String,
}

impl AddMemberForm {
    pub fn into_request(self) -> Result<CreateMemberRequest> {
        self.validate()?;

        let name = self.name.trim().to_string();
        let contact = self.contact.trim().to_string();
        if name.is_empty() || contact.is_empty() {
            return Err(AppError::Validation("Invalid input: name and contact are required".to_string()));
        }

        Ok(CreateMemberRequest {
            name,
            age: parse_form_int("age", &self.age)?,
            contact,
            email: non_blank(Some(self.email)),
            address: non_blank(Some(self.address)),
            emergency_contact: non_blank(Some(self.emergency_contact)),
            health_notes: non_blank(Some(self.health_notes)),
            plan_id: parse_form_int("plan", &self.plan)?,
            payment_method: non_blank(Some(self.payment_method)),
            start_date: parse_form_date("start_date", &self.start_date)?,
            expiry_date: parse_form_date("expiry_date", &self.expiry_date)?,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UpdateSubscriptionForm {
    pub new_plan: String,
    pub start_date: String,
    pub expiry_date: String,
}

impl UpdateSubscriptionForm {
    pub fn into_request(self) -> Result<UpdateSubscriptionRequest> {
        Ok(UpdateSubscriptionRequest {
            plan_id: parse_form_int("new_plan", &self.new_plan)?,
            start_date: parse_form_date("start_date", &self.start_date)?,
            expiry_date: parse_form_date("expiry_date", &self.expiry_date)?,
        })
    }
}

/// Validation messages are shown as-is; anything else gets the action's prefix.
fn failure_text(action: &str, err: &AppError) -> String {
    match err {
        AppError::Validation(msg) => msg.clone(),
        other => format!("Error {}: {}", action, other),
    }
}

/// An unreadable form body (wrong content type, bad encoding) is invalid input like any other.
fn read_form<T>(form: std::result::Result<Form<T>, FormRejection>) -> Result<T> {
    form.map(|Form(inner)| inner)
        .map_err(|rejection| AppError::Validation(format!("Invalid input: {}", rejection.body_text())))
}

/// Member ids that are not UUIDs cannot exist, so they take the not-found path.
fn parse_member_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

fn back_to_dashboard(jar: SignedCookieJar, level: FlashLevel, text: impl Into<String>) -> Response {
    (flash::push(jar, level, text), Redirect::to("/")).into_response()
}

// POST /add_member
pub async fn add_member(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    form: std::result::Result<Form<AddMemberForm>, FormRejection>,
) -> Response {
    let outcome = match read_form(form).and_then(AddMemberForm::into_request) {
        Ok(request) => state.service_context.member_service.add_member(request).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(member) => back_to_dashboard(
            jar,
            FlashLevel::Success,
            format!("Member added successfully! Member ID: {}", member.id),
        ),
        Err(e) => {
            tracing::warn!("Add member rejected: {}", e);
            back_to_dashboard(jar, FlashLevel::Danger, failure_text("adding member", &e))
        }
    }
}

// POST /update_subscription/:member_id
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    jar: SignedCookieJar,
    form: std::result::Result<Form<UpdateSubscriptionForm>, FormRejection>,
) -> Response {
    let outcome = match read_form(form).and_then(UpdateSubscriptionForm::into_request) {
        Ok(request) => match parse_member_id(&member_id) {
            Some(id) => state.service_context.member_service.update_subscription(id, request).await,
            None => Ok(false),
        },
        Err(e) => Err(e),
    };

    match outcome {
        Ok(true) => back_to_dashboard(jar, FlashLevel::Success, "Subscription updated successfully!"),
        Ok(false) => back_to_dashboard(jar, FlashLevel::Warning, "No changes made or member not found"),
        Err(e) => {
            tracing::warn!("Subscription update for {} rejected: {}", member_id, e);
            back_to_dashboard(jar, FlashLevel::Danger, failure_text("updating subscription", &e))
        }
    }
}

// GET /delete_member/:member_id
pub async fn delete_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    jar: SignedCookieJar,
) -> Response {
    let outcome = match parse_member_id(&member_id) {
        Some(id) => state.service_context.member_service.delete_member(id).await,
        None => Ok(false),
    };

    match outcome {
        Ok(true) => back_to_dashboard(jar, FlashLevel::Success, "Member deleted successfully!"),
        Ok(false) => back_to_dashboard(jar, FlashLevel::Warning, "Member not found"),
        Err(e) => {
            tracing::error!("Failed to delete member {}: {}", member_id, e);
            back_to_dashboard(jar, FlashLevel::Danger, failure_text("deleting member", &e))
        }
    }
}

// GET /delete_expired
pub async fn delete_expired(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Response {
    match state.service_context.member_service.delete_expired(Utc::now()).await {
        Ok(count) => back_to_dashboard(
            jar,
            FlashLevel::Success,
            format!("Deleted {} expired memberships", count),
        ),
        Err(e) => {
            tracing::error!("Failed to delete expired members: {}", e);
            back_to_dashboard(jar, FlashLevel::Danger, failure_text("deleting expired members", &e))
        }
    }
}

#[derive(Template)]
#[template(path = "members/detail.html")]
pub struct MemberDetailTemplate {
    pub page: PageContext,
    pub print_view: bool,
    pub member: MemberDetailView,
}

pub struct PaymentView {
    pub date: String,
    pub method: String,
}

pub struct MemberDetailView {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub contact: String,
    pub email: String,
    pub address: String,
    pub emergency_contact: String,
    pub health_notes: String,
    pub plan_id: i64,
    pub plan_name: String,
    pub plan_badge: &'static str,
    pub plan_price: String,
    pub plan_duration: String,
    pub start_date: String,
    pub expiry_date: String,
    pub active: bool,
    pub days_remaining: i64,
    pub days_since_joined: i64,
    pub member_since: String,
    pub payments: Vec<PaymentView>,
}

impl MemberDetailView {
    pub fn new(detail: &MemberDetail, now: DateTime<Utc>) -> Self {
        let member = &detail.member;
        let or_na = |value: &Option<String>| value.clone().unwrap_or_else(|| "N/A".to_string());

        let (plan_name, plan_price, plan_duration) = match &detail.plan {
            Some(plan) => (plan.plan_name.clone(), format!("${}", plan.price), plan.duration.clone()),
            None => ("Unknown".to_string(), "N/A".to_string(), "N/A".to_string()),
        };

        Self {
            id: member.id.to_string(),
            name: member.name.clone(),
            age: member.age,
            contact: member.contact.clone(),
            email: or_na(&member.email),
            address: or_na(&member.address),
            emergency_contact: or_na(&member.emergency_contact),
            health_notes: member.health_notes.clone().unwrap_or_else(|| "None".to_string()),
            plan_id: member.subscription.plan_id,
            plan_badge: plan_badge_class(&plan_name),
            plan_name,
            plan_price,
            plan_duration,
            start_date: format_date(member.subscription.start_date),
            expiry_date: format_date(member.subscription.expiry_date),
            active: member.subscription.is_active_at(now),
            days_remaining: member.days_remaining(now),
            days_since_joined: member.days_since_joined(now),
            member_since: format_date(member.created_at),
            payments: member
                .subscription
                .payments
                .iter()
                .map(|p| PaymentView {
                    date: format_date(p.date),
                    method: p.method.clone(),
                })
                .collect(),
        }
    }
}

async fn render_member(
    state: &AppState,
    current_admin: &CurrentAdmin,
    jar: SignedCookieJar,
    member_id: &str,
    print_view: bool,
) -> Response {
    let outcome = match parse_member_id(member_id) {
        Some(id) => state.service_context.member_service.member_detail(id).await,
        None => Err(AppError::NotFound("Member not found".to_string())),
    };

    let detail = match outcome {
        Ok(detail) => detail,
        Err(AppError::NotFound(_)) => {
            return back_to_dashboard(jar, FlashLevel::Danger, "Member not found");
        }
        Err(e) => {
            tracing::error!("Failed to load member {}: {}", member_id, e);
            let action = if print_view { "generating print view" } else { "loading member details" };
            return back_to_dashboard(jar, FlashLevel::Danger, failure_text(action, &e));
        }
    };

    let (jar, messages) = flash::take(jar);
    let template = MemberDetailTemplate {
        page: admin_page(current_admin, messages),
        print_view,
        member: MemberDetailView::new(&detail, Utc::now()),
    };

    if print_view {
        let disposition = format!("inline; filename=\"member_{}.html\"", detail.member.id);
        return (jar, [(header::CONTENT_DISPOSITION, disposition)], HtmlTemplate(template)).into_response();
    }

    (jar, HtmlTemplate(template)).into_response()
}

// GET /view_member/:member_id
pub async fn view_member(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    Path(member_id): Path<String>,
    jar: SignedCookieJar,
) -> Response {
    render_member(&state, &current_admin, jar, &member_id, false).await
}

// GET /print_member/:member_id
pub async fn print_member(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    Path(member_id): Path<String>,
    jar: SignedCookieJar,
) -> Response {
    render_member(&state, &current_admin, jar, &member_id, true).await
}
