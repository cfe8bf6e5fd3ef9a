use serde::{Deserialize, Serialize};

/// A subscription tier from the fixed plan catalog.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Plan {
    pub plan_id: i64,
    pub plan_name: String,
    pub price: i64,
    /// Human label, e.g. "3 Months".
    pub duration: String,
    pub duration_days: i64,
}

/// Catalog inserted when the `plans` table is empty.
pub fn default_plans() -> Vec<Plan> {
    vec![
        Plan {
            plan_id: 1,
            plan_name: "Basic".to_string(),
            price: 50,
            duration: "1 Month".to_string(),
            duration_days: 30,
        },
        Plan {
            plan_id: 2,
            plan_name: "Standard".to_string(),
            price: 120,
            duration: "3 Months".to_string(),
            duration_days: 90,
        },
        Plan {
            plan_id: 3,
            plan_name: "Premium".to_string(),
            price: 400,
            duration: "1 Year".to_string(),
            duration_days: 365,
        },
    ]
}
