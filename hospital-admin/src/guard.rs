//! Session guard for the admin screens.
//!
//! Every screen runs [`authorize`] before doing anything else. Denial is an
//! ordinary outcome: the caller answers with a redirect to the login page and
//! produces no body.

use crate::auth::{AdminSession, Role};

/// Path unauthenticated callers are sent to.
pub const LOGIN_PATH: &str = "/admin/login";

/// Request-scoped identity of the signed-in administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminContext {
    pub session_id: String,
    pub user_id: i64,
    pub username: String,
    /// One-shot message left by the previous request, if any.
    pub flash: Option<String>,
}

/// Outcome of the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow(AdminContext),
    Redirect,
}

/// Allow only a live session whose account role is Administrator.
pub fn authorize(session: Option<AdminSession>) -> Access {
    match session {
        Some(s) if s.role.parse::<Role>() == Ok(Role::Administrator) => {
            Access::Allow(AdminContext {
                session_id: s.session_id,
                user_id: s.user_id,
                username: s.username,
                flash: s.flash_message,
            })
        }
        _ => Access::Redirect,
    }
}
