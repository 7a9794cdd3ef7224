/// Logged volunteer hours and their review
///
/// A volunteer's own log starts `pending` and is reviewed by staff; hours
/// logged by staff are recorded as `approved` straight away. Once reviewed, a
/// log is locked against edits by its owner.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE hours_status AS ENUM ('pending', 'approved', 'rejected');
///
/// CREATE TABLE volunteer_hours (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     volunteer_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     date DATE NOT NULL,
///     hours DOUBLE PRECISION NOT NULL CHECK (hours > 0 AND hours <= 24),
///     activity VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status hours_status NOT NULL DEFAULT 'pending',
///     admin_notes TEXT NOT NULL DEFAULT '',
///     reviewed_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     reviewed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

const HOURS_COLUMNS: &str = "id, volunteer_id, date, hours, activity, description, status, \
                             admin_notes, reviewed_by, reviewed_at, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "hours_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HoursStatus {
    Pending,
    Approved,
    Rejected,
}

/// Review outcome; `pending` is not representable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoursDecision {
    Approved,
    Rejected,
}

impl From<HoursDecision> for HoursStatus {
    fn from(decision: HoursDecision) -> Self {
        match decision {
            HoursDecision::Approved => HoursStatus::Approved,
            HoursDecision::Rejected => HoursStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VolunteerHours {
    pub id: Uuid,

    /// Owning volunteer account
    pub volunteer_id: Uuid,

    pub date: NaiveDate,
    pub hours: f64,
    pub activity: String,
    pub description: String,
    pub status: HoursStatus,
    pub admin_notes: String,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VolunteerHours {
    pub fn is_pending(&self) -> bool {
        self.status == HoursStatus::Pending
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LogHours {
    pub date: NaiveDate,

    #[validate(range(exclusive_min = 0.0, max = 24.0, message = "hours must be between 0 and 24"))]
    pub hours: f64,

    #[validate(length(min = 1, max = 255, message = "activity is required"))]
    pub activity: String,

    #[serde(default)]
    pub description: String,
}

/// Row to insert; owner and initial status come from the caller's identity
#[derive(Debug, Clone)]
pub struct NewHours {
    pub volunteer_id: Uuid,
    pub status: HoursStatus,
    pub entry: LogHours,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateHours {
    pub date: Option<NaiveDate>,

    #[validate(range(exclusive_min = 0.0, max = 24.0, message = "hours must be between 0 and 24"))]
    pub hours: Option<f64>,

    #[validate(length(min = 1, max = 255, message = "activity must not be empty"))]
    pub activity: Option<String>,

    pub description: Option<String>,
}

impl UpdateHours {
    pub fn apply(self, log: &mut VolunteerHours, now: DateTime<Utc>) {
        if let Some(v) = self.date {
            log.date = v;
        }
        if let Some(v) = self.hours {
            log.hours = v;
        }
        if let Some(v) = self.activity {
            log.activity = v;
        }
        if let Some(v) = self.description {
            log.description = v;
        }
        log.updated_at = now;
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ReviewHours {
    pub status: HoursDecision,
    #[serde(default)]
    pub admin_notes: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HoursFilter {
    pub volunteer_id: Option<Uuid>,
    pub status: Option<HoursStatus>,
}

impl HoursFilter {
    pub fn matches(&self, log: &VolunteerHours) -> bool {
        self.volunteer_id.map_or(true, |id| log.volunteer_id == id)
            && self.status.map_or(true, |s| log.status == s)
    }
}

/// Per-volunteer summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HoursTotals {
    pub total_hours: f64,
    pub approved_hours: f64,
    pub pending_hours: f64,
    pub total_logs: i64,
}

impl HoursTotals {
    pub fn tally<'a, I: IntoIterator<Item = &'a VolunteerHours>>(logs: I) -> Self {
        let mut totals = HoursTotals::default();
        for log in logs {
            totals.total_logs += 1;
            totals.total_hours += log.hours;
            match log.status {
                HoursStatus::Approved => totals.approved_hours += log.hours,
                HoursStatus::Pending => totals.pending_hours += log.hours,
                HoursStatus::Rejected => {}
            }
        }
        totals
    }
}

impl VolunteerHours {
    pub async fn create(pool: &PgPool, data: NewHours) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO volunteer_hours (volunteer_id, date, hours, activity, description, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {HOURS_COLUMNS}"
        );

        sqlx::query_as::<_, VolunteerHours>(&sql)
            .bind(data.volunteer_id)
            .bind(data.entry.date)
            .bind(data.entry.hours)
            .bind(data.entry.activity)
            .bind(data.entry.description)
            .bind(data.status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {HOURS_COLUMNS} FROM volunteer_hours WHERE id = $1");
        sqlx::query_as::<_, VolunteerHours>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Most recent date first
    pub async fn list(pool: &PgPool, filter: HoursFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {HOURS_COLUMNS} FROM volunteer_hours WHERE TRUE"));
        if let Some(id) = filter.volunteer_id {
            query.push(" AND volunteer_id = ").push_bind(id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        query.push(" ORDER BY date DESC");

        query.build_query_as::<VolunteerHours>().fetch_all(pool).await
    }

    /// Edits a log
    ///
    /// With `pending_only`, the row is only touched while still `pending`, so
    /// a review that lands first wins and this returns `None`.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateHours,
        pending_only: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE volunteer_hours SET updated_at = NOW()");

        if let Some(v) = data.date {
            query.push(", date = ").push_bind(v);
        }
        if let Some(v) = data.hours {
            query.push(", hours = ").push_bind(v);
        }
        if let Some(v) = data.activity {
            query.push(", activity = ").push_bind(v);
        }
        if let Some(v) = data.description {
            query.push(", description = ").push_bind(v);
        }

        query.push(" WHERE id = ").push_bind(id);
        if pending_only {
            query.push(" AND status = 'pending'");
        }
        query.push(format!(" RETURNING {HOURS_COLUMNS}"));

        query.build_query_as::<VolunteerHours>().fetch_optional(pool).await
    }

    pub async fn review(
        pool: &PgPool,
        id: Uuid,
        review: ReviewHours,
        reviewed_by: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE volunteer_hours \
             SET status = $2, admin_notes = $3, reviewed_by = $4, reviewed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 RETURNING {HOURS_COLUMNS}"
        );

        sqlx::query_as::<_, VolunteerHours>(&sql)
            .bind(id)
            .bind(HoursStatus::from(review.status))
            .bind(review.admin_notes)
            .bind(reviewed_by)
            .fetch_optional(pool)
            .await
    }

    pub async fn totals(pool: &PgPool, volunteer_id: Uuid) -> Result<HoursTotals, sqlx::Error> {
        sqlx::query_as::<_, HoursTotals>(
            r#"
            SELECT COALESCE(SUM(hours), 0)::float8 AS total_hours,
                   COALESCE(SUM(hours) FILTER (WHERE status = 'approved'), 0)::float8 AS approved_hours,
                   COALESCE(SUM(hours) FILTER (WHERE status = 'pending'), 0)::float8 AS pending_hours,
                   COUNT(*) AS total_logs
            FROM volunteer_hours
            WHERE volunteer_id = $1
            "#,
        )
        .bind(volunteer_id)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM volunteer_hours WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
