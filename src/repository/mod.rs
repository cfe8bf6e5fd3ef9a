use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod admin_repository;
pub mod member_repository;
pub mod plan_repository;

pub use admin_repository::SqliteAdminRepository;
pub use member_repository::SqliteMemberRepository;
pub use plan_repository::SqlitePlanRepository;

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn create(&self, member: CreateMemberRequest) -> Result<Member>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>>;
    /// All members, ordered by name.
    async fn list(&self) -> Result<Vec<Member>>;
    /// Members whose expiry is strictly before `now`, soonest-expired first.
    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<Member>>;
    async fn list_by_plan(&self, plan_id: i64) -> Result<Vec<Member>>;
    /// Rewrites only the subscription plan/dates and `updated_at`.
    /// Returns the number of members changed (0 or 1).
    async fn update_subscription(&self, id: Uuid, update: UpdateSubscriptionRequest) -> Result<u64>;
    /// Returns `true` when a member was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64>;
    async fn delete_all(&self) -> Result<u64>;
    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Plan>>;
    async fn find_by_id(&self, plan_id: i64) -> Result<Option<Plan>>;
    async fn count(&self) -> Result<i64>;
    async fn insert(&self, plan: &Plan) -> Result<()>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn create(&self, admin: CreateAdminRequest) -> Result<Admin>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>>;
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;
    async fn count(&self) -> Result<i64>;
}
