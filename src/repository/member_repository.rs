use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow, types::Json};
use uuid::Uuid;

use crate::{
    domain::{
        CreateMemberRequest, Member, PaymentRecord, Subscription, UpdateSubscriptionRequest,
    },
    error::{AppError, Result},
    repository::MemberRepository,
};

const MEMBER_COLUMNS: &str = r#"
    id, name, age, contact, email, address, emergency_contact, health_notes,
    subscription_plan_id, subscription_start_date, subscription_expiry_date,
    subscription_status, subscription_payments, created_at, updated_at
"#;

// Database row struct that matches SQLite schema
#[derive(FromRow)]
struct MemberRow {
    id: String,
    name: String,
    age: i32,
    contact: String,
    email: Option<String>,
    address: Option<String>,
    emergency_contact: Option<String>,
    health_notes: Option<String>,
    subscription_plan_id: i64,
    subscription_start_date: NaiveDateTime,
    subscription_expiry_date: NaiveDateTime,
    subscription_status: String,
    subscription_payments: Json<Vec<PaymentRecord>>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteMemberRepository {
    pool: SqlitePool,
}

impl SqliteMemberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_member(row: MemberRow) -> Result<Member> {
        Ok(Member {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            age: row.age,
            contact: row.contact,
            email: row.email,
            address: row.address,
            emergency_contact: row.emergency_contact,
            health_notes: row.health_notes,
            subscription: Subscription {
                plan_id: row.subscription_plan_id,
                start_date: DateTime::from_naive_utc_and_offset(row.subscription_start_date, Utc),
                expiry_date: DateTime::from_naive_utc_and_offset(row.subscription_expiry_date, Utc),
                status: row.subscription_status,
                payments: row.subscription_payments.0,
            },
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn rows_to_members(rows: Vec<MemberRow>) -> Result<Vec<Member>> {
        rows.into_iter()
            .map(Self::row_to_member)
            .collect()
    }
}

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    async fn create(&self, request: CreateMemberRequest) -> Result<Member> {
        let id = Uuid::new_v4();
        let now_naive = Utc::now().naive_utc();
        let payments = Json(request.initial_payments());

        sqlx::query(
            r#"
            INSERT INTO members (
                id, name, age, contact, email, address, emergency_contact, health_notes,
                subscription_plan_id, subscription_start_date, subscription_expiry_date,
                subscription_status, subscription_payments, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'active', ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(request.age)
        .bind(&request.contact)
        .bind(&request.email)
        .bind(&request.address)
        .bind(&request.emergency_contact)
        .bind(&request.health_notes)
        .bind(request.plan_id)
        .bind(request.start_date.naive_utc())
        .bind(request.expiry_date.naive_utc())
        .bind(payments)
        .bind(now_naive)
        .bind(now_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created member".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            &format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS)
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_member(r)?)),
            None => Ok(None)
        }
    }

    async fn list(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            &format!("SELECT {} FROM members ORDER BY name ASC", MEMBER_COLUMNS)
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Self::rows_to_members(rows)
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            &format!(
                r#"
                SELECT {} FROM members
                WHERE subscription_expiry_date < ?
                ORDER BY subscription_expiry_date ASC
                "#,
                MEMBER_COLUMNS
            )
        )
        .bind(now.naive_utc())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Self::rows_to_members(rows)
    }

    async fn list_by_plan(&self, plan_id: i64) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            &format!(
                "SELECT {} FROM members WHERE subscription_plan_id = ? ORDER BY name ASC",
                MEMBER_COLUMNS
            )
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Self::rows_to_members(rows)
    }

    async fn update_subscription(&self, id: Uuid, update: UpdateSubscriptionRequest) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET subscription_plan_id = ?,
                subscription_start_date = ?,
                subscription_expiry_date = ?,
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(update.plan_id)
        .bind(update.start_date.naive_utc())
        .bind(update.expiry_date.naive_utc())
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM members WHERE subscription_expiry_date < ?")
            .bind(now.naive_utc())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM members")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
