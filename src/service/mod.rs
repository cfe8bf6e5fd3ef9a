pub mod member_service;
pub mod seed_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use crate::auth::AuthService;
use member_service::MemberService;

pub use member_service::{DashboardData, MemberDetail, PlanRoster};

/// Everything a request handler needs, built once at startup and shared behind an `Arc`.
pub struct ServiceContext {
    pub member_repo: Arc<dyn MemberRepository>,
    pub plan_repo: Arc<dyn PlanRepository>,
    pub admin_repo: Arc<dyn AdminRepository>,
    pub auth_service: Arc<AuthService>,
    pub member_service: Arc<MemberService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool) -> Self {
        let member_repo: Arc<dyn MemberRepository> =
            Arc::new(SqliteMemberRepository::new(db_pool.clone()));
        let plan_repo: Arc<dyn PlanRepository> =
            Arc::new(SqlitePlanRepository::new(db_pool.clone()));
        let admin_repo: Arc<dyn AdminRepository> =
            Arc::new(SqliteAdminRepository::new(db_pool.clone()));

        let auth_service = Arc::new(AuthService::new(admin_repo.clone()));
        let member_service = Arc::new(MemberService::new(member_repo.clone(), plan_repo.clone()));

        Self {
            member_repo,
            plan_repo,
            admin_repo,
            auth_service,
            member_service,
            db_pool,
        }
    }
}
