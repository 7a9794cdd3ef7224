/// First super admin
///
/// A fresh database has no account that can create other accounts. When
/// `SUPER_ADMIN_EMAIL` and `SUPER_ADMIN_PASSWORD` are set, start-up creates
/// that account unless the e-mail is already registered. An existing account
/// is left exactly as it is, password included.

use anyhow::Context;
use suryoday_shared::{
    auth::password,
    models::user::{AccountStatus, CreateUser, Role},
    store::Store,
};
use uuid::Uuid;

use crate::config::SuperAdminConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    Created(Uuid),
    AlreadyPresent,
}

pub async fn ensure_super_admin(store: &dyn Store, settings: &SuperAdminConfig) -> anyhow::Result<Bootstrap> {
    if store
        .user_by_email(&settings.email)
        .await
        .context("looking up super admin")?
        .is_some()
    {
        tracing::debug!(email = %settings.email, "Super admin already present");
        return Ok(Bootstrap::AlreadyPresent);
    }

    password::validate_password_strength(&settings.password)
        .map_err(|e| anyhow::anyhow!("SUPER_ADMIN_PASSWORD rejected: {e}"))?;
    let password_hash = password::hash_password(&settings.password)?;

    let created = store
        .insert_user(CreateUser {
            name: settings.name.clone(),
            email: settings.email.clone(),
            password_hash,
            role: Role::SuperAdmin,
            status: AccountStatus::Active,
            volunteer_id: None,
            created_by: None,
        })
        .await;

    match created {
        Ok(user) => {
            tracing::info!(user_id = %user.id, email = %user.email, "Super admin created");
            Ok(Bootstrap::Created(user.id))
        }
        // Another instance got there first
        Err(e) if e.is_conflict() => Ok(Bootstrap::AlreadyPresent),
        Err(e) => Err(e).context("creating super admin"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suryoday_shared::store::{MemoryStore, UserStore};

    fn settings(password: &str) -> SuperAdminConfig {
        SuperAdminConfig {
            email: "root@suryoday.org".into(),
            password: password.into(),
            name: "Root".into(),
        }
    }

    #[tokio::test]
    async fn test_creates_once() {
        let store = MemoryStore::new();

        let first = ensure_super_admin(&store, &settings("changeme")).await.unwrap();
        assert!(matches!(first, Bootstrap::Created(_)));

        let second = ensure_super_admin(&store, &settings("different")).await.unwrap();
        assert_eq!(second, Bootstrap::AlreadyPresent);

        let user = store.user_by_email("root@suryoday.org").await.unwrap().unwrap();
        assert_eq!(user.role, Role::SuperAdmin);
        assert!(password::verify_password("changeme", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let store = MemoryStore::new();
        assert!(ensure_super_admin(&store, &settings("123")).await.is_err());
        assert!(store.list_users().await.unwrap().is_empty());
    }
}
