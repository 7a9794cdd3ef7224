/// Volunteer application model and database operations
///
/// # State Machine
///
/// ```text
/// pending → approved → active
/// pending → rejected                (terminal)
/// approved | active ⇄ inactive
/// ```
///
/// `approved` may be re-entered from `approved` so a retried or concurrent
/// approval is not an error. Nothing returns to `pending`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE volunteer_status AS ENUM (
///     'pending', 'approved', 'rejected', 'active', 'inactive'
/// );
///
/// CREATE TABLE volunteers (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email CITEXT NOT NULL UNIQUE,
///     phone VARCHAR(50) NOT NULL,
///     age INTEGER NOT NULL,
///     skills TEXT[] NOT NULL DEFAULT '{}',
///     availability JSONB NOT NULL DEFAULT '{}',
///     experience TEXT NOT NULL DEFAULT '',
///     motivation TEXT NOT NULL,
///     emergency_contact JSONB NOT NULL DEFAULT '{}',
///     status volunteer_status NOT NULL DEFAULT 'pending',
///     approved_by UUID, approved_at TIMESTAMPTZ,
///     rejected_by UUID, rejected_at TIMESTAMPTZ,
///     rejection_reason TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

const VOLUNTEER_COLUMNS: &str = "id, name, email, phone, age, skills, availability, experience, \
                                 motivation, emergency_contact, status, approved_by, approved_at, \
                                 rejected_by, rejected_at, rejection_reason, created_at, updated_at";

/// Lifecycle state of a volunteer application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "volunteer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VolunteerStatus {
    /// Submitted, awaiting review
    Pending,

    /// Accepted; a linked volunteer account exists (or is being provisioned)
    Approved,

    /// Declined. Terminal.
    Rejected,

    /// Working volunteer
    Active,

    /// Deactivated; may be reactivated
    Inactive,
}

impl VolunteerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolunteerStatus::Pending => "pending",
            VolunteerStatus::Approved => "approved",
            VolunteerStatus::Rejected => "rejected",
            VolunteerStatus::Active => "active",
            VolunteerStatus::Inactive => "inactive",
        }
    }

    /// Checks if transition to target state is valid
    pub fn can_transition_to(&self, target: VolunteerStatus) -> bool {
        use VolunteerStatus::*;

        match (self, target) {
            (Pending, Approved) | (Pending, Rejected) => true,

            // Re-approval is idempotent
            (Approved, Approved) => true,
            (Approved, Active) | (Approved, Inactive) => true,

            (Active, Active) | (Active, Inactive) => true,
            (Inactive, Active) | (Inactive, Inactive) => true,

            _ => false,
        }
    }

    /// States reachable only through approve/reject, never through a
    /// profile edit
    pub fn is_review_outcome(&self) -> bool {
        matches!(
            self,
            VolunteerStatus::Pending | VolunteerStatus::Approved | VolunteerStatus::Rejected
        )
    }

    /// Account status the linked user should carry while the application is
    /// in this state, if any
    pub fn linked_account_status(&self) -> Option<super::user::AccountStatus> {
        use super::user::AccountStatus;

        match self {
            VolunteerStatus::Approved | VolunteerStatus::Active => Some(AccountStatus::Active),
            VolunteerStatus::Rejected | VolunteerStatus::Inactive => Some(AccountStatus::Inactive),
            VolunteerStatus::Pending => None,
        }
    }
}

impl std::fmt::Display for VolunteerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Volunteer application row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Volunteer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: i32,
    pub skills: Vec<String>,
    pub availability: JsonValue,
    pub experience: String,
    pub motivation: String,
    pub emergency_contact: JsonValue,
    pub status: VolunteerStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<Uuid>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public application form
///
/// Unknown fields are rejected so typos surface as validation errors.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct VolunteerApplication {
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,

    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 50, message = "phone is required"))]
    pub phone: String,

    #[validate(range(min = 1, max = 120, message = "age must be between 1 and 120"))]
    pub age: i32,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default = "empty_object")]
    pub availability: JsonValue,

    #[serde(default)]
    pub experience: String,

    #[validate(length(min = 1, message = "motivation is required"))]
    pub motivation: String,

    #[serde(default = "empty_object", alias = "emergencyContact")]
    pub emergency_contact: JsonValue,
}

fn empty_object() -> JsonValue {
    JsonValue::Object(Default::default())
}

/// Admin-side partial update of an application
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateVolunteer {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: Option<String>,

    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 50, message = "phone must not be empty"))]
    pub phone: Option<String>,

    #[validate(range(min = 1, max = 120, message = "age must be between 1 and 120"))]
    pub age: Option<i32>,

    pub skills: Option<Vec<String>>,
    pub availability: Option<JsonValue>,
    pub experience: Option<String>,
    pub motivation: Option<String>,

    #[serde(alias = "emergencyContact")]
    pub emergency_contact: Option<JsonValue>,

    pub status: Option<VolunteerStatus>,
}

impl UpdateVolunteer {
    pub fn apply(self, volunteer: &mut Volunteer, now: DateTime<Utc>) {
        let UpdateVolunteer {
            name,
            email,
            phone,
            age,
            skills,
            availability,
            experience,
            motivation,
            emergency_contact,
            status,
        } = self;

        if let Some(v) = name {
            volunteer.name = v;
        }
        if let Some(v) = email {
            volunteer.email = v;
        }
        if let Some(v) = phone {
            volunteer.phone = v;
        }
        if let Some(v) = age {
            volunteer.age = v;
        }
        if let Some(v) = skills {
            volunteer.skills = v;
        }
        if let Some(v) = availability {
            volunteer.availability = v;
        }
        if let Some(v) = experience {
            volunteer.experience = v;
        }
        if let Some(v) = motivation {
            volunteer.motivation = v;
        }
        if let Some(v) = emergency_contact {
            volunteer.emergency_contact = v;
        }
        if let Some(v) = status {
            volunteer.status = v;
        }
        volunteer.updated_at = now;
    }
}

/// Application counts for the admin dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VolunteerStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub active: i64,
}

impl VolunteerStats {
    /// Tallies a set of statuses
    pub fn tally<I: IntoIterator<Item = VolunteerStatus>>(statuses: I) -> Self {
        let mut stats = VolunteerStats::default();
        for status in statuses {
            stats.total += 1;
            match status {
                VolunteerStatus::Pending => stats.pending += 1,
                VolunteerStatus::Approved => stats.approved += 1,
                VolunteerStatus::Rejected => stats.rejected += 1,
                VolunteerStatus::Active => stats.active += 1,
                VolunteerStatus::Inactive => {}
            }
        }
        stats
    }
}

impl Volunteer {
    /// Inserts a new `pending` application
    pub async fn create(pool: &PgPool, data: VolunteerApplication) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO volunteers (name, email, phone, age, skills, availability, experience, \
             motivation, emergency_contact) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {VOLUNTEER_COLUMNS}"
        );

        sqlx::query_as::<_, Volunteer>(&sql)
            .bind(data.name)
            .bind(data.email)
            .bind(data.phone)
            .bind(data.age)
            .bind(data.skills)
            .bind(data.availability)
            .bind(data.experience)
            .bind(data.motivation)
            .bind(data.emergency_contact)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {VOLUNTEER_COLUMNS} FROM volunteers WHERE id = $1");
        sqlx::query_as::<_, Volunteer>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {VOLUNTEER_COLUMNS} FROM volunteers WHERE email = $1");
        sqlx::query_as::<_, Volunteer>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Lists applications, newest first, optionally filtered by status
    pub async fn list(
        pool: &PgPool,
        status: Option<VolunteerStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {VOLUNTEER_COLUMNS} FROM volunteers"));
        if let Some(status) = status {
            query.push(" WHERE status = ").push_bind(status);
        }
        query.push(" ORDER BY created_at DESC");

        query.build_query_as::<Volunteer>().fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateVolunteer,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE volunteers SET updated_at = NOW()");

        if let Some(name) = data.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(email) = data.email {
            query.push(", email = ").push_bind(email);
        }
        if let Some(phone) = data.phone {
            query.push(", phone = ").push_bind(phone);
        }
        if let Some(age) = data.age {
            query.push(", age = ").push_bind(age);
        }
        if let Some(skills) = data.skills {
            query.push(", skills = ").push_bind(skills);
        }
        if let Some(availability) = data.availability {
            query.push(", availability = ").push_bind(availability);
        }
        if let Some(experience) = data.experience {
            query.push(", experience = ").push_bind(experience);
        }
        if let Some(motivation) = data.motivation {
            query.push(", motivation = ").push_bind(motivation);
        }
        if let Some(contact) = data.emergency_contact {
            query.push(", emergency_contact = ").push_bind(contact);
        }
        if let Some(status) = data.status {
            query.push(", status = ").push_bind(status);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {VOLUNTEER_COLUMNS}"));

        query.build_query_as::<Volunteer>().fetch_optional(pool).await
    }

    /// Marks the application approved
    ///
    /// The `WHERE` guard makes the transition atomic: returns `None` if the
    /// row is missing or no longer in a state that may be approved. Approving
    /// an approved row changes nothing, so the first approver is kept.
    pub async fn mark_approved(
        pool: &PgPool,
        id: Uuid,
        approved_by: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE volunteers \
             SET approved_by = CASE WHEN status = 'pending' THEN $2 ELSE approved_by END, \
                 approved_at = CASE WHEN status = 'pending' THEN NOW() ELSE approved_at END, \
                 updated_at = CASE WHEN status = 'pending' THEN NOW() ELSE updated_at END, \
                 status = 'approved' \
             WHERE id = $1 AND status IN ('pending', 'approved') \
             RETURNING {VOLUNTEER_COLUMNS}"
        );

        sqlx::query_as::<_, Volunteer>(&sql)
            .bind(id)
            .bind(approved_by)
            .fetch_optional(pool)
            .await
    }

    /// Marks a pending application rejected; `None` if it was not pending
    pub async fn mark_rejected(
        pool: &PgPool,
        id: Uuid,
        rejected_by: Uuid,
        reason: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE volunteers \
             SET status = 'rejected', rejected_by = $2, rejection_reason = $3, \
                 rejected_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {VOLUNTEER_COLUMNS}"
        );

        sqlx::query_as::<_, Volunteer>(&sql)
            .bind(id)
            .bind(rejected_by)
            .bind(reason)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM volunteers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn stats(pool: &PgPool) -> Result<VolunteerStats, sqlx::Error> {
        sqlx::query_as::<_, VolunteerStats>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                   COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                   COUNT(*) FILTER (WHERE status = 'rejected') AS rejected,
                   COUNT(*) FILTER (WHERE status = 'active') AS active
            FROM volunteers
            "#,
        )
        .fetch_one(pool)
        .await
    }
}
