//! Authentication boundary.
//!
//! The crate never manages credentials; it only needs to know who is
//! acting. PDF generation requires a signed-in user, draft editing does
//! not.

use crate::store::UserId;

/// Supplies the currently authenticated user, if any.
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<UserId>;
}

/// Fixed authentication state for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user: Option<UserId>,
}

impl StaticAuth {
    /// A provider that reports the given user as signed in.
    pub fn signed_in(id: impl Into<String>) -> Self {
        Self {
            user: Some(UserId::new(id)),
        }
    }

    /// A provider with nobody signed in.
    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<UserId> {
        self.user.clone()
    }
}
