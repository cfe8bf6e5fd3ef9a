mod dashboard;
mod members;
mod plans;

use std::collections::HashMap;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};
use chrono::{DateTime, Utc};

use crate::{
    api::{middleware::auth::CurrentAdmin, state::AppState},
    domain::{Member, Plan, FORM_DATE_FORMAT},
    web::{flash::FlashMessage, templates::PageContext},
};

pub fn create_portal_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard_page))
        .route("/add_member", post(members::add_member))
        .route("/update_subscription/:member_id", post(members::update_subscription))
        .route("/delete_member/:member_id", get(members::delete_member))
        .route("/delete_expired", get(members::delete_expired))
        .route("/members_by_plan/:plan_id", get(plans::members_by_plan))
        .route("/view_member/:member_id", get(members::view_member))
        .route("/print_member/:member_id", get(members::print_member))
        .route(
            "/logout",
            get(crate::web::templates::auth::logout_handler)
                .post(crate::web::templates::auth::logout_handler),
        )

        // Every route above needs a logged-in admin
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::api::middleware::auth::require_admin_session,
        ))
}

// Shared view models used across portal pages

pub fn admin_page(current_admin: &CurrentAdmin, messages: Vec<FlashMessage>) -> PageContext {
    PageContext::for_admin(&current_admin.session.full_name, messages)
}

pub struct PlanView {
    pub plan_id: i64,
    pub name: String,
    pub price: i64,
    pub duration: String,
    pub duration_days: i64,
    pub badge_class: &'static str,
    pub icon: &'static str,
}

impl From<&Plan> for PlanView {
    fn from(plan: &Plan) -> Self {
        Self {
            plan_id: plan.plan_id,
            name: plan.plan_name.clone(),
            price: plan.price,
            duration: plan.duration.clone(),
            duration_days: plan.duration_days,
            badge_class: plan_badge_class(&plan.plan_name),
            icon: plan_icon(&plan.plan_name),
        }
    }
}

pub fn plan_badge_class(plan_name: &str) -> &'static str {
    match plan_name {
        "Premium" => "badge-primary",
        "Standard" => "badge-success",
        _ => "badge-secondary",
    }
}

pub fn plan_icon(plan_name: &str) -> &'static str {
    match plan_name {
        "Premium" => "crown",
        "Standard" => "star",
        _ => "tag",
    }
}

/// One line of a members table.
pub struct MemberRowView {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub contact: String,
    pub plan_id: i64,
    pub plan_name: String,
    pub plan_badge: &'static str,
    pub start_date: String,
    pub expiry_date: String,
    pub active: bool,
    pub days_expired: i64,
}

/// Plan names keyed by id, so member rows can be labelled without a lookup per row.
pub struct PlanNames<'a>(HashMap<i64, &'a str>);

impl<'a> PlanNames<'a> {
    pub fn new(plans: &'a [Plan]) -> Self {
        Self(plans.iter().map(|p| (p.plan_id, p.plan_name.as_str())).collect())
    }

    pub fn name(&self, plan_id: i64) -> &'a str {
        self.0.get(&plan_id).copied().unwrap_or("Unknown")
    }
}

impl MemberRowView {
    pub fn new(member: &Member, plan_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: member.id.to_string(),
            name: member.name.clone(),
            age: member.age,
            contact: member.contact.clone(),
            plan_id: member.subscription.plan_id,
            plan_name: plan_name.to_string(),
            plan_badge: plan_badge_class(plan_name),
            start_date: format_date(member.subscription.start_date),
            expiry_date: format_date(member.subscription.expiry_date),
            active: member.subscription.is_active_at(now),
            days_expired: member.days_expired(now).max(0),
        }
    }
}

pub fn format_date(date: DateTime<Utc>) -> String {
    date.format(FORM_DATE_FORMAT).to_string()
}
