use std::sync::Arc;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{MemberRepository, PlanRepository},
};

/// Everything the dashboard page shows.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub members: Vec<Member>,
    pub plans: Vec<Plan>,
    pub expired: Vec<Member>,
}

#[derive(Debug, Clone)]
pub struct PlanRoster {
    pub plan: Plan,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone)]
pub struct MemberDetail {
    pub member: Member,
    /// `None` when the member points at a plan missing from the catalog.
    pub plan: Option<Plan>,
}

pub struct MemberService {
    repo: Arc<dyn MemberRepository>,
    plans: Arc<dyn PlanRepository>,
}

impl MemberService {
    pub fn new(
        repo: Arc<dyn MemberRepository>,
        plans: Arc<dyn PlanRepository>,
    ) -> Self {
        Self { repo, plans }
    }

    pub async fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardData> {
        let members = self.repo.list().await?;
        let plans = self.plans.list().await?;
        let expired = self.repo.list_expired(now).await?;

        Ok(DashboardData { members, plans, expired })
    }

    pub async fn add_member(&self, request: CreateMemberRequest) -> Result<Member> {
        validate_subscription_dates(request.start_date, request.expiry_date)?;
        self.ensure_plan_exists(request.plan_id).await?;

        let member = self.repo.create(request).await?;
        tracing::info!("Member {} ({}) created", member.id, member.name);

        Ok(member)
    }

    /// Returns `false` when no member matched; that is a soft outcome, not an error.
    pub async fn update_subscription(&self, id: Uuid, request: UpdateSubscriptionRequest) -> Result<bool> {
        validate_subscription_dates(request.start_date, request.expiry_date)?;
        self.ensure_plan_exists(request.plan_id).await?;

        let changed = self.repo.update_subscription(id, request).await?;
        if changed > 0 {
            tracing::info!("Subscription updated for member {}", id);
        }

        Ok(changed > 0)
    }

    pub async fn delete_member(&self, id: Uuid) -> Result<bool> {
        let deleted = self.repo.delete(id).await?;
        if deleted {
            tracing::info!("Member {} deleted", id);
        }
        Ok(deleted)
    }

    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let count = self.repo.delete_expired(now).await?;
        tracing::info!("Deleted {} expired memberships", count);
        Ok(count)
    }

    pub async fn members_by_plan(&self, plan_id: i64) -> Result<PlanRoster> {
        let plan = self.plans.find_by_id(plan_id).await?
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;

        let members = self.repo.list_by_plan(plan_id).await?;

        Ok(PlanRoster { plan, members })
    }

    pub async fn member_detail(&self, id: Uuid) -> Result<MemberDetail> {
        let member = self.repo.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let plan = self.plans.find_by_id(member.subscription.plan_id).await?;

        Ok(MemberDetail { member, plan })
    }

    async fn ensure_plan_exists(&self, plan_id: i64) -> Result<()> {
        if self.plans.find_by_id(plan_id).await?.is_none() {
            return Err(AppError::Validation("Selected plan does not exist".to_string()));
        }
        Ok(())
    }
}
