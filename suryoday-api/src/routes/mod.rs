/// API route handlers
///
/// One module per resource:
///
/// - `health`: Liveness and store connectivity
/// - `auth`: Login, session identity, password change
/// - `users`: Account administration
/// - `volunteers`: Applications and their review
/// - `tasks`: Assignments and progress
/// - `volunteer_hours`: Time logs and their review
/// - `events`, `content`, `gallery`, `urgent_needs`: Published site content
/// - `cms`: Read-only CMS collections

pub mod auth;
pub mod cms;
pub mod content;
pub mod events;
pub mod gallery;
pub mod health;
pub mod tasks;
pub mod urgent_needs;
pub mod users;
pub mod volunteer_hours;
pub mod volunteers;

use serde::Serialize;

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Staff callers also see drafts and archived items on public reads
pub(crate) fn sees_unpublished(auth: Option<&suryoday_shared::auth::middleware::AuthContext>) -> bool {
    auth.is_some_and(|a| a.role.is_staff())
}
