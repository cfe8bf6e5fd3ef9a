use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Date format used by every form on the dashboard (`<input type="date">`).
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub contact: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub health_notes: Option<String>,
    pub subscription: Subscription,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub plan_id: i64,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    /// Display hint carried over from historical records. Never consulted for
    /// active/expired decisions; use [`Subscription::is_active_at`].
    pub status: String,
    pub payments: Vec<PaymentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub date: DateTime<Utc>,
    pub method: String,
}

impl Subscription {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date > now
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }
}

impl Member {
    /// Whole days until expiry, rounded down; negative once expired.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        floor_days(self.subscription.expiry_date, now)
    }

    /// Whole days since expiry, rounded down.
    pub fn days_expired(&self, now: DateTime<Utc>) -> i64 {
        floor_days(now, self.subscription.expiry_date)
    }

    /// Whole days since the record was created, rounded down.
    pub fn days_since_joined(&self, now: DateTime<Utc>) -> i64 {
        floor_days(now, self.created_at)
    }
}

fn floor_days(later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    (later - earlier).num_seconds().div_euclid(SECONDS_PER_DAY)
}

#[derive(Debug, Clone)]
pub struct CreateMemberRequest {
    pub name: String,
    pub age: i32,
    pub contact: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub health_notes: Option<String>,
    pub plan_id: i64,
    pub payment_method: Option<String>,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpdateSubscriptionRequest {
    pub plan_id: i64,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}

impl CreateMemberRequest {
    /// The payments list stored for a new member: one record on the start date,
    /// or nothing when no method was given.
    pub fn initial_payments(&self) -> Vec<PaymentRecord> {
        self.payment_method
            .as_ref()
            .map(|method| {
                vec![PaymentRecord {
                    date: self.start_date,
                    method: method.clone(),
                }]
            })
            .unwrap_or_default()
    }
}

/// Parse a `YYYY-MM-DD` form value as midnight UTC.
pub fn parse_form_date(field: &str, value: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value.trim(), FORM_DATE_FORMAT).map_err(|e| {
        AppError::Validation(format!(
            "Invalid input: {} '{}' is not a valid date ({})",
            field, value, e
        ))
    })?;

    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AppError::Internal("midnight is always a valid time".to_string()))
}

/// Parse an integer form value, reporting the field name on failure.
pub fn parse_form_int<T: std::str::FromStr>(field: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| {
        AppError::Validation(format!(
            "Invalid input: {} '{}' is not a whole number ({})",
            field, value, e
        ))
    })
}

/// Rejects subscriptions whose expiry is not strictly after their start.
pub fn validate_subscription_dates(start: DateTime<Utc>, expiry: DateTime<Utc>) -> Result<()> {
    if expiry <= start {
        return Err(AppError::Validation(
            "Expiry date must be after start date".to_string(),
        ));
    }
    Ok(())
}

/// Blank optional form fields are stored as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn member_expiring(expiry: DateTime<Utc>, created_at: DateTime<Utc>) -> Member {
        Member {
            id: Uuid::new_v4(),
            name: "John Doe".to_string(),
            age: 28,
            contact: "123-456-7890".to_string(),
            email: None,
            address: None,
            emergency_contact: None,
            health_notes: None,
            subscription: Subscription {
                plan_id: 2,
                start_date: created_at,
                expiry_date: expiry,
                status: "active".to_string(),
                payments: vec![],
            },
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn parses_form_dates_at_midnight_utc() {
        let parsed = parse_form_date("start_date", "2024-03-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_malformed_dates_as_invalid_input() {
        let err = parse_form_date("start_date", "03/01/2024").unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.starts_with("Invalid input:")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn rejects_non_numeric_age() {
        assert!(matches!(
            parse_form_int::<i32>("age", "twenty"),
            Err(AppError::Validation(_))
        ));
        assert_eq!(parse_form_int::<i32>("age", " 28 ").unwrap(), 28);
    }

    #[test]
    fn expiry_must_be_strictly_after_start() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert!(validate_subscription_dates(start, start + Duration::days(1)).is_ok());

        let err = validate_subscription_dates(start, start).unwrap_err();
        assert_eq!(err.to_string(), "Expiry date must be after start date");
        assert!(validate_subscription_dates(start, start - Duration::days(1)).is_err());
    }

    #[test]
    fn status_is_derived_from_expiry_not_stored_field() {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let mut member = member_expiring(
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        );
        member.subscription.status = "active".to_string();

        assert!(!member.subscription.is_active_at(now));
        assert!(member.subscription.is_expired_at(now));
    }

    #[test]
    fn day_counts_round_down() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let expiry = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let member = member_expiring(expiry, created);

        let now = Utc.with_ymd_and_hms(2024, 5, 30, 12, 0, 0).unwrap();
        assert_eq!(member.days_remaining(now), 1);
        assert_eq!(member.days_since_joined(now), 90);

        let later = Utc.with_ymd_and_hms(2024, 6, 3, 6, 0, 0).unwrap();
        assert_eq!(member.days_remaining(later), -3);
        assert_eq!(member.days_expired(later), 2);
    }

    #[test]
    fn payment_method_becomes_single_payment_record() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut request = CreateMemberRequest {
            name: "John Doe".to_string(),
            age: 28,
            contact: "123".to_string(),
            email: None,
            address: None,
            emergency_contact: None,
            health_notes: None,
            plan_id: 2,
            payment_method: Some("credit card".to_string()),
            start_date: start,
            expiry_date: start + Duration::days(92),
        };

        assert_eq!(
            request.initial_payments(),
            vec![PaymentRecord { date: start, method: "credit card".to_string() }]
        );

        request.payment_method = None;
        assert!(request.initial_payments().is_empty());
    }

    #[test]
    fn blank_optional_fields_are_absent() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" a@b.c ".to_string())), Some("a@b.c".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
