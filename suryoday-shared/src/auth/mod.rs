/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id hashing and temporary passwords
/// - [`jwt`]: Session token issuance and verification
/// - [`middleware`]: Request identity for Axum
/// - [`authorization`]: Role gate, ownership guards and account-change rules
///
/// # Example
///
/// ```
/// use suryoday_shared::auth::jwt::TokenIssuer;
/// use suryoday_shared::auth::password::{hash_password, verify_password};
/// use suryoday_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let issuer = TokenIssuer::new("a-secret-key-that-is-at-least-32-bytes", 24);
/// let token = issuer.issue(Uuid::new_v4(), Role::Volunteer)?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
