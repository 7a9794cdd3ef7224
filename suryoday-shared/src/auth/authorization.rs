/// Role gate, ownership guards and account-change rules
///
/// # Permission Model
///
/// 1. **Access level**: every protected route names an [`Access`] level; the
///    caller's [`Role`] must be in that level's set.
/// 2. **Ownership**: for rows with an owner (tasks, logged hours) a
///    `volunteer` only reaches its own rows. Staff roles bypass the check.
/// 3. **Account changes**: nobody changes their own role or status or deletes
///    themselves through the account endpoints; only a super admin manages
///    roles, status, deletion and other super admins.
///
/// # Example
///
/// ```
/// use suryoday_shared::auth::authorization::{authorize, Access};
/// use suryoday_shared::auth::middleware::AuthContext;
/// use suryoday_shared::models::user::Role;
/// use uuid::Uuid;
///
/// let admin = AuthContext::new(Uuid::new_v4(), Role::Admin);
/// assert!(authorize(Access::Admin, Some(&admin)).is_ok());
/// assert!(authorize(Access::SuperAdmin, Some(&admin)).is_err());
/// assert!(authorize(Access::Authenticated, None).is_err());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::{Role, User};

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No verified identity on the request
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Role not in the allowed set
    #[error("Insufficient permissions")]
    InsufficientRole { required: Access, actual: Role },

    /// Volunteer touching a row owned by someone else
    #[error("Access denied")]
    NotOwner,

    /// Actor targeting their own account
    #[error("{}", .0.self_change_message())]
    SelfModification(AccountChange),

    /// Target account is protected from this actor
    #[error("{0}")]
    ProtectedAccount(&'static str),

    /// Only super admins create staff accounts
    #[error("Only Super Admin can create admin accounts")]
    StaffCreationRestricted,

    /// Row is past the state where its owner may edit it
    #[error("{0}")]
    Locked(&'static str),
}

/// Access level required by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// `{super_admin}`
    SuperAdmin,

    /// `{super_admin, admin}`
    Admin,

    /// `{super_admin, admin, volunteer}`
    Authenticated,
}

impl Access {
    /// Whether `role` belongs to this level's set
    pub fn allows(&self, role: Role) -> bool {
        match (self, role) {
            (Access::SuperAdmin, Role::SuperAdmin) => true,
            (Access::SuperAdmin, Role::Admin | Role::Volunteer) => false,

            (Access::Admin, Role::SuperAdmin | Role::Admin) => true,
            (Access::Admin, Role::Volunteer) => false,

            (Access::Authenticated, Role::SuperAdmin | Role::Admin | Role::Volunteer) => true,
        }
    }
}

/// Admits the request if a verified identity is present and its role is in
/// the required set
pub fn authorize(
    required: Access,
    identity: Option<&AuthContext>,
) -> Result<&AuthContext, AuthzError> {
    let auth = identity.ok_or(AuthzError::AuthenticationRequired)?;

    if !required.allows(auth.role) {
        return Err(AuthzError::InsufficientRole {
            required,
            actual: auth.role,
        });
    }

    Ok(auth)
}

/// Owner filter for list endpoints
///
/// `Some(id)` restricts a volunteer to its own rows; staff see everything.
pub fn owner_scope(auth: &AuthContext) -> Option<Uuid> {
    match auth.role {
        Role::Volunteer => Some(auth.user_id),
        Role::SuperAdmin | Role::Admin => None,
    }
}

/// Rejects a volunteer acting on a row it does not own
pub fn require_owner(auth: &AuthContext, owner_id: Uuid) -> Result<(), AuthzError> {
    match owner_scope(auth) {
        Some(id) if id != owner_id => Err(AuthzError::NotOwner),
        _ => Ok(()),
    }
}

/// Kind of change an actor attempts on an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountChange {
    Role,
    Status,
    Profile,
    Delete,
}

impl AccountChange {
    fn self_change_message(&self) -> &'static str {
        match self {
            AccountChange::Role => "You cannot change your own role",
            AccountChange::Status => "You cannot change your own status",
            AccountChange::Profile => "You cannot modify your own account here",
            AccountChange::Delete => "You cannot delete your own account",
        }
    }

    /// Role gate that applies before any target-specific rule
    pub fn required_access(&self) -> Access {
        match self {
            AccountChange::Role | AccountChange::Status | AccountChange::Delete => {
                Access::SuperAdmin
            }
            AccountChange::Profile => Access::Admin,
        }
    }
}

/// Checks whether `actor` may apply `change` to `target`
///
/// Self-targeting fails first, regardless of the actor's role.
pub fn authorize_account_change(
    actor: &AuthContext,
    target: &User,
    change: AccountChange,
) -> Result<(), AuthzError> {
    if actor.user_id == target.id {
        return Err(AuthzError::SelfModification(change));
    }

    authorize(change.required_access(), Some(actor))?;

    if target.role == Role::SuperAdmin {
        if change == AccountChange::Delete {
            return Err(AuthzError::ProtectedAccount(
                "Super admin accounts cannot be deleted",
            ));
        }
        if actor.role != Role::SuperAdmin {
            return Err(AuthzError::ProtectedAccount(
                "Only Super Admin can modify super admin accounts",
            ));
        }
    }

    Ok(())
}

/// Staff may create volunteer accounts; only a super admin creates staff
pub fn authorize_account_creation(actor: &AuthContext, role: Role) -> Result<(), AuthzError> {
    authorize(Access::Admin, Some(actor))?;

    if role.is_staff() && actor.role != Role::SuperAdmin {
        return Err(AuthzError::StaffCreationRestricted);
    }

    Ok(())
}
