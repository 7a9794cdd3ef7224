/// Tower middleware for the API server
///
/// Request identity lives in `suryoday_shared::auth::middleware`; this
/// module holds the HTTP-only layers.

pub mod security;
