/// Volunteer application lifecycle
///
/// # State Machine
///
/// ```text
/// submit ──▶ pending ──approve──▶ approved ──edit──▶ active ⇄ inactive
///               │                     ▲
///               └──reject──▶ rejected └── approve (idempotent)
/// ```
///
/// Approval provisions one `volunteer` account per application email. The
/// unique email index decides races: whichever insert loses gets a conflict,
/// which is reported as [`AccountProvisioning::AlreadyProvisioned`].
///
/// Nothing here is transactional. The status write happens first, then the
/// account insert, then notifications; a failure part-way leaves the earlier
/// steps in place and approval can simply be retried.
///
/// Callers are responsible for the admin gate; every method except
/// [`VolunteerLifecycle::submit`] assumes it already passed.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::auth::password::{generate_temporary_password, hash_password, PasswordError};
use crate::effects::{notify, Effect, EffectOutcome};
use crate::mail::{templates, Mailer};
use crate::models::user::{AccountStatus, CreateUser, Role, UpdateUser};
use crate::models::volunteer::{
    UpdateVolunteer, Volunteer, VolunteerApplication, VolunteerStats, VolunteerStatus,
};
use crate::store::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Volunteer not found")]
    NotFound,

    #[error("You have already submitted an application")]
    DuplicateApplication,

    #[error("Email already in use by another volunteer")]
    EmailInUse,

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition {
        from: VolunteerStatus,
        to: VolunteerStatus,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Result of provisioning the volunteer's login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AccountProvisioning {
    Created { user_id: Uuid },
    AlreadyProvisioned,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
    pub volunteer: Volunteer,
    pub account: AccountProvisioning,
    pub notification: EffectOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectionOutcome {
    pub volunteer: Volunteer,
    pub notification: EffectOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub volunteer: Volunteer,
    pub account_sync: EffectOutcome,
}

#[derive(Clone)]
pub struct VolunteerLifecycle {
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
    portal_url: String,
}

impl VolunteerLifecycle {
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, portal_url: impl Into<String>) -> Self {
        Self {
            store,
            mailer,
            portal_url: portal_url.into(),
        }
    }

    /// Stores a new `pending` application
    ///
    /// The input must already have passed validation.
    pub async fn submit(&self, application: VolunteerApplication) -> Result<Volunteer, LifecycleError> {
        if self.store.volunteer_by_email(&application.email).await?.is_some() {
            return Err(LifecycleError::DuplicateApplication);
        }

        let volunteer = self
            .store
            .insert_volunteer(application)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => LifecycleError::DuplicateApplication,
                other => other.into(),
            })?;

        tracing::info!(volunteer_id = %volunteer.id, "Volunteer application submitted");
        Ok(volunteer)
    }

    pub async fn approve(&self, id: Uuid, actor: Uuid) -> Result<ApprovalOutcome, LifecycleError> {
        let current = self.find(id).await?;
        ensure_transition(current.status, VolunteerStatus::Approved)?;

        let volunteer = match self.store.mark_volunteer_approved(id, actor).await? {
            Some(v) => v,
            // Lost a race with a delete or a reject
            None => {
                let latest = self.find(id).await?;
                return Err(LifecycleError::InvalidTransition {
                    from: latest.status,
                    to: VolunteerStatus::Approved,
                });
            }
        };

        let temporary_password = generate_temporary_password();
        let account = CreateUser {
            name: volunteer.name.clone(),
            email: volunteer.email.clone(),
            password_hash: hash_password(&temporary_password)?,
            role: Role::Volunteer,
            status: AccountStatus::Active,
            volunteer_id: Some(volunteer.id),
            created_by: Some(actor),
        };

        let account = match self.store.insert_user(account).await {
            Ok(user) => AccountProvisioning::Created { user_id: user.id },
            Err(StoreError::Conflict(constraint)) => {
                tracing::info!(volunteer_id = %id, %constraint, "Volunteer account already provisioned");
                AccountProvisioning::AlreadyProvisioned
            }
            Err(e) => {
                tracing::error!(volunteer_id = %id, error = %e, "Failed to provision volunteer account");
                return Err(e.into());
            }
        };

        let credentials = match account {
            AccountProvisioning::Created { .. } => Some(templates::Credentials {
                email: &volunteer.email,
                temporary_password: &temporary_password,
            }),
            AccountProvisioning::AlreadyProvisioned => None,
        };
        let message = templates::volunteer_approved(&volunteer.name, credentials, &self.portal_url);
        let notification = notify(self.mailer.as_ref(), &volunteer.email, &message).await;

        tracing::info!(volunteer_id = %id, approved_by = %actor, ?account, "Volunteer approved");
        Ok(ApprovalOutcome {
            volunteer,
            account,
            notification,
        })
    }

    pub async fn reject(
        &self,
        id: Uuid,
        actor: Uuid,
        reason: Option<String>,
    ) -> Result<RejectionOutcome, LifecycleError> {
        let current = self.find(id).await?;
        ensure_transition(current.status, VolunteerStatus::Rejected)?;

        let reason = reason.unwrap_or_default();
        let Some(volunteer) = self.store.mark_volunteer_rejected(id, actor, &reason).await? else {
            let latest = self.find(id).await?;
            return Err(LifecycleError::InvalidTransition {
                from: latest.status,
                to: VolunteerStatus::Rejected,
            });
        };

        let message = templates::volunteer_rejected(&volunteer.name, &reason);
        let notification = notify(self.mailer.as_ref(), &volunteer.email, &message).await;

        tracing::info!(volunteer_id = %id, rejected_by = %actor, "Volunteer rejected");
        Ok(RejectionOutcome {
            volunteer,
            notification,
        })
    }

    /// Admin edit of an application, mirrored onto the linked account
    pub async fn update_profile(
        &self,
        id: Uuid,
        data: UpdateVolunteer,
    ) -> Result<ProfileUpdate, LifecycleError> {
        let current = self.find(id).await?;

        if let Some(target) = data.status {
            if target.is_review_outcome() && target != current.status {
                return Err(LifecycleError::InvalidTransition {
                    from: current.status,
                    to: target,
                });
            }
            if target != current.status {
                ensure_transition(current.status, target)?;
            }
        }

        if let Some(email) = &data.email {
            if let Some(other) = self.store.volunteer_by_email(email).await? {
                if other.id != id {
                    return Err(LifecycleError::EmailInUse);
                }
            }
        }

        let sync = UpdateUser {
            name: data.name.clone(),
            email: data.email.clone(),
            status: data.status.and_then(|s| s.linked_account_status()),
            ..Default::default()
        };

        let volunteer = self
            .store
            .update_volunteer(id, data)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => LifecycleError::EmailInUse,
                other => other.into(),
            })?
            .ok_or(LifecycleError::NotFound)?;

        let account_sync = self.sync_account(id, sync).await;

        Ok(ProfileUpdate {
            volunteer,
            account_sync,
        })
    }

    /// Removes the linked account (best-effort), then the application
    pub async fn delete(&self, id: Uuid) -> Result<EffectOutcome, LifecycleError> {
        self.find(id).await?;

        let account_removal = match self.store.user_by_volunteer(id).await {
            Ok(Some(user)) if user.role == Role::Volunteer => {
                EffectOutcome::from_result(Effect::AccountRemoval, self.store.delete_user(user.id).await)
            }
            Ok(_) => EffectOutcome::Skipped,
            Err(e) => EffectOutcome::from_result::<(), _>(Effect::AccountRemoval, Err(e)),
        };

        if !self.store.delete_volunteer(id).await? {
            return Err(LifecycleError::NotFound);
        }

        tracing::info!(volunteer_id = %id, ?account_removal, "Volunteer deleted");
        Ok(account_removal)
    }

    pub async fn stats(&self) -> Result<VolunteerStats, LifecycleError> {
        Ok(self.store.volunteer_stats().await?)
    }

    async fn find(&self, id: Uuid) -> Result<Volunteer, LifecycleError> {
        self.store
            .volunteer_by_id(id)
            .await?
            .ok_or(LifecycleError::NotFound)
    }

    async fn sync_account(&self, volunteer_id: Uuid, changes: UpdateUser) -> EffectOutcome {
        if changes.is_empty() {
            return EffectOutcome::Skipped;
        }

        let user = match self.store.user_by_volunteer(volunteer_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return EffectOutcome::Skipped,
            Err(e) => return EffectOutcome::from_result::<(), _>(Effect::AccountSync, Err(e)),
        };

        let result = self.store.update_user(user.id, changes).await;
        EffectOutcome::from_result(Effect::AccountSync, result)
    }
}

fn ensure_transition(from: VolunteerStatus, to: VolunteerStatus) -> Result<(), LifecycleError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::RecordingMailer;
    use crate::store::{MemoryStore, UserStore, VolunteerStore};

    struct Fixture {
        store: MemoryStore,
        mailer: RecordingMailer,
        lifecycle: VolunteerLifecycle,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let lifecycle = VolunteerLifecycle::new(
            Arc::new(store.clone()),
            Arc::new(mailer.clone()),
            "http://localhost:3000",
        );
        Fixture { store, mailer, lifecycle }
    }

    fn application(email: &str) -> VolunteerApplication {
        serde_json::from_value(serde_json::json!({
            "name": "A", "email": email, "phone": "1", "age": 30, "motivation": "care"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_rejects_duplicate_email() {
        let f = fixture();
        let v = f.lifecycle.submit(application("a@x.com")).await.unwrap();
        assert_eq!(v.status, VolunteerStatus::Pending);

        let err = f.lifecycle.submit(application("A@x.com")).await.unwrap_err();
        assert!(matches!(err, LifecycleError::DuplicateApplication));
    }

    #[tokio::test]
    async fn test_approve_creates_linked_account_and_mails() {
        let f = fixture();
        let admin = Uuid::new_v4();
        let v = f.lifecycle.submit(application("a@x.com")).await.unwrap();

        let outcome = f.lifecycle.approve(v.id, admin).await.unwrap();
        assert_eq!(outcome.volunteer.status, VolunteerStatus::Approved);
        assert_eq!(outcome.volunteer.approved_by, Some(admin));
        assert_eq!(outcome.notification, EffectOutcome::Delivered);

        let AccountProvisioning::Created { user_id } = outcome.account else {
            panic!("expected a new account");
        };
        let user = f.store.user_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(user.role, Role::Volunteer);
        assert_eq!(user.status, AccountStatus::Active);
        assert_eq!(user.volunteer_id, Some(v.id));
        assert_eq!(user.created_by, Some(admin));

        let mails = f.mailer.sent_to("a@x.com").await;
        assert_eq!(mails.len(), 1);
        assert!(mails[0].html.contains("Temporary Password"));
    }

    #[tokio::test]
    async fn test_second_approval_is_already_provisioned() {
        let f = fixture();
        let v = f.lifecycle.submit(application("a@x.com")).await.unwrap();
        let first_admin = Uuid::new_v4();
        let first = f.lifecycle.approve(v.id, first_admin).await.unwrap();

        let again = f.lifecycle.approve(v.id, Uuid::new_v4()).await.unwrap();
        assert_eq!(again.account, AccountProvisioning::AlreadyProvisioned);
        assert_eq!(again.volunteer.approved_by, Some(first_admin));
        assert_eq!(again.volunteer.approved_at, first.volunteer.approved_at);
        assert_eq!(f.store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_approval_yields_one_account() {
        let f = fixture();
        let v = f.lifecycle.submit(application("a@x.com")).await.unwrap();

        let (a, b) = tokio::join!(
            f.lifecycle.approve(v.id, Uuid::new_v4()),
            f.lifecycle.approve(v.id, Uuid::new_v4()),
        );
        let outcomes = [a.unwrap().account, b.unwrap().account];

        let created = outcomes
            .iter()
            .filter(|o| matches!(o, AccountProvisioning::Created { .. }))
            .count();
        assert_eq!(created, 1);
        assert_eq!(f.store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mail_failure_does_not_fail_approval() {
        let f = fixture();
        f.mailer.set_failing(true);
        let v = f.lifecycle.submit(application("a@x.com")).await.unwrap();

        let outcome = f.lifecycle.approve(v.id, Uuid::new_v4()).await.unwrap();
        assert!(outcome.notification.is_failed());
        assert_eq!(outcome.volunteer.status, VolunteerStatus::Approved);
    }

    #[tokio::test]
    async fn test_account_insert_failure_keeps_approval() {
        let f = fixture();
        let v = f.lifecycle.submit(application("a@x.com")).await.unwrap();

        f.store.fail_user_inserts(true);
        let err = f.lifecycle.approve(v.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Store(_)));

        let stored = f.store.volunteer_by_id(v.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VolunteerStatus::Approved);

        // retry succeeds once the store recovers
        f.store.fail_user_inserts(false);
        let outcome = f.lifecycle.approve(v.id, Uuid::new_v4()).await.unwrap();
        assert!(matches!(outcome.account, AccountProvisioning::Created { .. }));
    }

    #[tokio::test]
    async fn test_reject_only_from_pending() {
        let f = fixture();
        let v = f.lifecycle.submit(application("a@x.com")).await.unwrap();

        let outcome = f.lifecycle.reject(v.id, Uuid::new_v4(), None).await.unwrap();
        assert_eq!(outcome.volunteer.status, VolunteerStatus::Rejected);
        assert_eq!(outcome.volunteer.rejection_reason.as_deref(), Some(""));
        assert!(f.store.list_users().await.unwrap().is_empty());

        assert!(matches!(
            f.lifecycle.approve(v.id, Uuid::new_v4()).await,
            Err(LifecycleError::InvalidTransition { .. })
        ));
        assert!(matches!(
            f.lifecycle.reject(v.id, Uuid::new_v4(), None).await,
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_volunteer() {
        let f = fixture();
        assert!(matches!(
            f.lifecycle.approve(Uuid::new_v4(), Uuid::new_v4()).await,
            Err(LifecycleError::NotFound)
        ));
        assert!(matches!(f.lifecycle.delete(Uuid::new_v4()).await, Err(LifecycleError::NotFound)));
    }

    #[tokio::test]
    async fn test_profile_edit_status_rules() {
        let f = fixture();
        let v = f.lifecycle.submit(application("a@x.com")).await.unwrap();

        // pending can only move through review
        let to_active = UpdateVolunteer { status: Some(VolunteerStatus::Active), ..Default::default() };
        assert!(f.lifecycle.update_profile(v.id, to_active.clone()).await.is_err());

        f.lifecycle.approve(v.id, Uuid::new_v4()).await.unwrap();
        let updated = f.lifecycle.update_profile(v.id, to_active).await.unwrap();
        assert_eq!(updated.volunteer.status, VolunteerStatus::Active);

        let back = UpdateVolunteer { status: Some(VolunteerStatus::Pending), ..Default::default() };
        assert!(matches!(
            f.lifecycle.update_profile(v.id, back).await,
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_profile_edit_syncs_account() {
        let f = fixture();
        let v = f.lifecycle.submit(application("a@x.com")).await.unwrap();
        f.lifecycle.approve(v.id, Uuid::new_v4()).await.unwrap();

        let edit = UpdateVolunteer {
            name: Some("Asha".into()),
            status: Some(VolunteerStatus::Inactive),
            ..Default::default()
        };
        let result = f.lifecycle.update_profile(v.id, edit).await.unwrap();
        assert_eq!(result.account_sync, EffectOutcome::Delivered);

        let user = f.store.user_by_volunteer(v.id).await.unwrap().unwrap();
        assert_eq!(user.name, "Asha");
        assert_eq!(user.status, AccountStatus::Inactive);
    }

    #[tokio::test]
    async fn test_profile_edit_email_in_use() {
        let f = fixture();
        let a = f.lifecycle.submit(application("a@x.com")).await.unwrap();
        f.lifecycle.submit(application("b@x.com")).await.unwrap();

        let edit = UpdateVolunteer { email: Some("B@x.com".into()), ..Default::default() };
        assert!(matches!(
            f.lifecycle.update_profile(a.id, edit).await,
            Err(LifecycleError::EmailInUse)
        ));

        let same = UpdateVolunteer { email: Some("a@x.com".into()), ..Default::default() };
        assert!(f.lifecycle.update_profile(a.id, same).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_removes_linked_account() {
        let f = fixture();
        let v = f.lifecycle.submit(application("a@x.com")).await.unwrap();
        f.lifecycle.approve(v.id, Uuid::new_v4()).await.unwrap();

        let removal = f.lifecycle.delete(v.id).await.unwrap();
        assert_eq!(removal, EffectOutcome::Delivered);
        assert!(f.store.list_users().await.unwrap().is_empty());
        assert!(f.store.volunteer_by_id(v.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats() {
        let f = fixture();
        let a = f.lifecycle.submit(application("a@x.com")).await.unwrap();
        let b = f.lifecycle.submit(application("b@x.com")).await.unwrap();
        f.lifecycle.submit(application("c@x.com")).await.unwrap();
        f.lifecycle.approve(a.id, Uuid::new_v4()).await.unwrap();
        f.lifecycle.reject(b.id, Uuid::new_v4(), Some("full".into())).await.unwrap();

        let stats = f.lifecycle.stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.approved, 1);
        assert_eq!(stats.rejected, 1);
    }
}
