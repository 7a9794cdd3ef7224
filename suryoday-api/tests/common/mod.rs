//! Common test utilities for integration tests
//!
//! Every test builds the real router over in-process collaborators:
//! - [`MemoryStore`] for persistence
//! - [`RecordingMailer`] to inspect outgoing e-mail
//! - [`StaticCmsClient`] with canned documents
//!
//! Three accounts are seeded (super admin, admin, volunteer), all with
//! [`PASSWORD`], along with tokens for each.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use suryoday_api::app::{build_router, AppState};
use suryoday_api::config::Config;
use suryoday_shared::auth::jwt::TokenIssuer;
use suryoday_shared::auth::password::hash_password;
use suryoday_shared::cms::{CmsClient, CmsCollection, StaticCmsClient};
use suryoday_shared::mail::RecordingMailer;
use suryoday_shared::models::user::{AccountStatus, CreateUser, Role, User};
use suryoday_shared::store::{MemoryStore, UserStore};
use tower::ServiceExt;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const PASSWORD: &str = "password123";
pub const FRONTEND_URL: &str = "https://suryoday.test";

pub struct TestContext {
    pub app: Router,
    pub store: MemoryStore,
    pub mailer: RecordingMailer,
    pub issuer: TokenIssuer,
    pub super_admin: User,
    pub admin: User,
    pub volunteer: User,
    password_hash: String,
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| {
        let value = match key {
            "DATABASE_URL" => "postgresql://localhost/unused",
            "JWT_SECRET" => SECRET,
            "FRONTEND_URL" => FRONTEND_URL,
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("test config")
}

pub fn default_cms() -> StaticCmsClient {
    StaticCmsClient::new()
        .with(
            CmsCollection::UrgentNeeds,
            json!([{ "_id": "need-1", "title": "Winter blankets" }]),
        )
        .with(
            CmsCollection::PendingVolunteers,
            json!([{ "_id": "vol-1", "name": "Asha", "status": "pending" }]),
        )
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_cms(Arc::new(default_cms())).await
    }

    pub async fn with_cms(cms: Arc<dyn CmsClient>) -> Self {
        let store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let config = test_config();
        let issuer = TokenIssuer::new(SECRET, config.jwt.expiration_hours);

        let state = AppState::new(
            config,
            Arc::new(store.clone()),
            Arc::new(mailer.clone()),
            cms,
        );
        let app = build_router(state);

        // One hash for every seeded account keeps set-up fast
        let password_hash = hash_password(PASSWORD).expect("hash");

        let super_admin = seed(&store, &password_hash, "Root", "root@suryoday.test", Role::SuperAdmin).await;
        let admin = seed(&store, &password_hash, "Meera", "meera@suryoday.test", Role::Admin).await;
        let volunteer = seed(&store, &password_hash, "Ravi", "ravi@suryoday.test", Role::Volunteer).await;

        Self {
            app,
            store,
            mailer,
            issuer,
            super_admin,
            admin,
            volunteer,
            password_hash,
        }
    }

    pub fn token_for(&self, user: &User) -> String {
        self.issuer.issue(user.id, user.role).expect("token")
    }

    pub fn super_admin_token(&self) -> String {
        self.token_for(&self.super_admin)
    }

    pub fn admin_token(&self) -> String {
        self.token_for(&self.admin)
    }

    pub fn volunteer_token(&self) -> String {
        self.token_for(&self.volunteer)
    }

    /// Adds another account with [`PASSWORD`]
    pub async fn seed_user(&self, name: &str, email: &str, role: Role) -> User {
        seed(&self.store, &self.password_hash, name, email, role).await
    }

    /// Sends one request through the router and decodes the JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body ({status}): {}", String::from_utf8_lossy(&bytes))
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Submits the standard application for `email` and returns its id
    pub async fn apply(&self, name: &str, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/volunteers/apply",
                None,
                json!({
                    "name": name,
                    "email": email,
                    "phone": "9800000000",
                    "age": 30,
                    "motivation": "care",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["volunteer"]["id"].as_str().expect("volunteer id").to_string()
    }
}

async fn seed(store: &MemoryStore, password_hash: &str, name: &str, email: &str, role: Role) -> User {
    store
        .insert_user(CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            status: AccountStatus::Active,
            volunteer_id: None,
            created_by: None,
        })
        .await
        .expect("seed user")
}
