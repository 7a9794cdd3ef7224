//! # Suryoday Shared Library
//!
//! Domain types and business logic behind the Suryoday volunteer and
//! donations API.
//!
//! ## Module Organization
//!
//! - `auth`: tokens, password hashing, the role gate and ownership guards
//! - `models`: database rows, input schemas and their SQL
//! - `store`: persistence traits with Postgres and in-memory implementations
//! - `lifecycle`: volunteer application review and account provisioning
//! - `mail`: transactional e-mail client and templates
//! - `effects`: best-effort side effect outcomes
//! - `cms`: read-only headless CMS client
//! - `db`: connection pool and migrations

pub mod auth;
pub mod cms;
pub mod db;
pub mod effects;
pub mod lifecycle;
pub mod mail;
pub mod models;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
