use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{
    domain::Plan,
    error::{AppError, Result},
    repository::PlanRepository,
};

pub struct SqlitePlanRepository {
    pool: SqlitePool,
}

impl SqlitePlanRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanRepository for SqlitePlanRepository {
    async fn list(&self) -> Result<Vec<Plan>> {
        let plans = sqlx::query_as::<_, Plan>(
            r#"
            SELECT plan_id, plan_name, price, duration, duration_days
            FROM plans
            ORDER BY plan_id ASC
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(plans)
    }

    async fn find_by_id(&self, plan_id: i64) -> Result<Option<Plan>> {
        let plan = sqlx::query_as::<_, Plan>(
            r#"
            SELECT plan_id, plan_name, price, duration, duration_days
            FROM plans
            WHERE plan_id = ?
            "#
        )
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(plan)
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM plans")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn insert(&self, plan: &Plan) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO plans (plan_id, plan_name, price, duration, duration_days)
            VALUES (?, ?, ?, ?, ?)
            "#
        )
        .bind(plan.plan_id)
        .bind(&plan.plan_name)
        .bind(plan.price)
        .bind(&plan.duration)
        .bind(plan.duration_days)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
