/// Database models for Suryoday
///
/// Each model owns its row type, its input types (validated with
/// `validator`), and its SQL. Handlers never talk to these directly; they go
/// through the [`crate::store`] traits so tests can swap in memory.
///
/// # Models
///
/// - `user`: Accounts, roles and login status
/// - `volunteer`: Volunteer applications and their lifecycle states
/// - `task`: Tasks assigned to volunteers
/// - `event`: Public events
/// - `content`: Editorial content blocks
/// - `urgent_need`: Donation appeals
/// - `gallery`: Photo gallery
/// - `volunteer_hours`: Logged hours and their review

pub mod content;
pub mod event;
pub mod gallery;
pub mod task;
pub mod urgent_need;
pub mod user;
pub mod volunteer;
pub mod volunteer_hours;
