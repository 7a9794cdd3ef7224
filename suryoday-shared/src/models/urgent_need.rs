/// Urgent donation appeals shown on the public site
///
/// # Schema
///
/// ```sql
/// CREATE TABLE urgent_needs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     target_amount DOUBLE PRECISION NOT NULL CHECK (target_amount > 0),
///     raised_amount DOUBLE PRECISION NOT NULL DEFAULT 0,
///     category VARCHAR(100) NOT NULL DEFAULT 'general',
///     end_date DATE,
///     is_urgent BOOLEAN NOT NULL DEFAULT TRUE,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

use super::task::default_category;

const NEED_COLUMNS: &str = "id, title, description, target_amount, raised_amount, category, \
                            end_date, is_urgent, is_active, created_by, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UrgentNeed {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub target_amount: f64,
    pub raised_amount: f64,
    pub category: String,
    pub end_date: Option<NaiveDate>,
    pub is_urgent: bool,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateUrgentNeed {
    #[validate(length(min = 1, max = 255, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "target_amount must be greater than 0"))]
    pub target_amount: f64,
    #[serde(default = "default_category")]
    pub category: String,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUrgentNeed {
    #[validate(length(min = 1, max = 255, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "target_amount must be greater than 0"))]
    pub target_amount: Option<f64>,
    #[validate(range(min = 0.0, message = "raised_amount must not be negative"))]
    pub raised_amount: Option<f64>,
    pub category: Option<String>,
    pub end_date: Option<NaiveDate>,
    pub is_urgent: Option<bool>,
    pub is_active: Option<bool>,
}

impl UpdateUrgentNeed {
    pub fn apply(self, need: &mut UrgentNeed, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            need.title = v;
        }
        if let Some(v) = self.description {
            need.description = v;
        }
        if let Some(v) = self.target_amount {
            need.target_amount = v;
        }
        if let Some(v) = self.raised_amount {
            need.raised_amount = v;
        }
        if let Some(v) = self.category {
            need.category = v;
        }
        if let Some(v) = self.end_date {
            need.end_date = Some(v);
        }
        if let Some(v) = self.is_urgent {
            need.is_urgent = v;
        }
        if let Some(v) = self.is_active {
            need.is_active = v;
        }
        need.updated_at = now;
    }
}

/// A donation recorded against a need
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Donation {
    #[validate(range(exclusive_min = 0.0, message = "amount must be greater than 0"))]
    pub amount: f64,
}

impl UrgentNeed {
    pub async fn create(
        pool: &PgPool,
        data: CreateUrgentNeed,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO urgent_needs (title, description, target_amount, category, end_date, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {NEED_COLUMNS}"
        );

        sqlx::query_as::<_, UrgentNeed>(&sql)
            .bind(data.title)
            .bind(data.description)
            .bind(data.target_amount)
            .bind(data.category)
            .bind(data.end_date)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {NEED_COLUMNS} FROM urgent_needs WHERE id = $1");
        sqlx::query_as::<_, UrgentNeed>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Newest first; `active_only` hides closed appeals
    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {NEED_COLUMNS} FROM urgent_needs"));
        if active_only {
            query.push(" WHERE is_active");
        }
        query.push(" ORDER BY created_at DESC");

        query.build_query_as::<UrgentNeed>().fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUrgentNeed,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE urgent_needs SET updated_at = NOW()");

        if let Some(v) = data.title {
            query.push(", title = ").push_bind(v);
        }
        if let Some(v) = data.description {
            query.push(", description = ").push_bind(v);
        }
        if let Some(v) = data.target_amount {
            query.push(", target_amount = ").push_bind(v);
        }
        if let Some(v) = data.raised_amount {
            query.push(", raised_amount = ").push_bind(v);
        }
        if let Some(v) = data.category {
            query.push(", category = ").push_bind(v);
        }
        if let Some(v) = data.end_date {
            query.push(", end_date = ").push_bind(v);
        }
        if let Some(v) = data.is_urgent {
            query.push(", is_urgent = ").push_bind(v);
        }
        if let Some(v) = data.is_active {
            query.push(", is_active = ").push_bind(v);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {NEED_COLUMNS}"));

        query.build_query_as::<UrgentNeed>().fetch_optional(pool).await
    }

    /// Adds `amount` to `raised_amount` in a single statement
    pub async fn add_donation(
        pool: &PgPool,
        id: Uuid,
        amount: f64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE urgent_needs SET raised_amount = raised_amount + $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {NEED_COLUMNS}"
        );
        sqlx::query_as::<_, UrgentNeed>(&sql)
            .bind(id)
            .bind(amount)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM urgent_needs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_donation_must_be_positive() {
        assert!(Donation { amount: 250.0 }.validate().is_ok());
        assert!(Donation { amount: 0.0 }.validate().is_err());
        assert!(Donation { amount: -5.0 }.validate().is_err());
    }

    #[test]
    fn test_create_requires_positive_target() {
        let input: CreateUrgentNeed = serde_json::from_value(serde_json::json!({
            "title": "Winter blankets",
            "target_amount": 0
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_requires_target_amount() {
        let result = serde_json::from_value::<CreateUrgentNeed>(serde_json::json!({
            "title": "Winter blankets"
        }));
        assert!(result.is_err());
    }
}
