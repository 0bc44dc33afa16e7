//! Session and role gate consumed by every mutating service operation.
//!
//! The authentication collaborator itself (login, session storage) lives
//! outside this crate; services only see the resolved session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
}

impl Session {
    pub fn new(user: SessionUser) -> Self {
        Self { user }
    }
}

/// Admin gate. Must run before any persistence access so that non-admin
/// callers cannot probe for record existence.
pub fn require_admin(session: Option<&Session>) -> AppResult<&SessionUser> {
    match session {
        Some(session) if session.user.role == UserRole::Admin => Ok(&session.user),
        Some(_) => Err(AppError::Unauthorized(
            "Admin role required for this operation".to_string(),
        )),
        None => Err(AppError::Unauthorized(
            "No active session".to_string(),
        )),
    }
}

#[cfg(test)]
pub(crate) fn test_session(role: UserRole) -> Session {
    Session::new(SessionUser {
        id: Uuid::new_v4(),
        username: "tester".to_string(),
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_the_gate() {
        let session = test_session(UserRole::Admin);
        let user = require_admin(Some(&session)).unwrap();
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn non_admin_is_rejected() {
        let session = test_session(UserRole::User);
        let err = require_admin(Some(&session)).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn missing_session_is_rejected() {
        let err = require_admin(None).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
