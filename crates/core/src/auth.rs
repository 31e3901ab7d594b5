use serde::{Deserialize, Serialize};

use crate::UserId;

/// Authenticated caller resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
    display_name: String,
    email: Option<String>,
    approved: bool,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        email: Option<String>,
        approved: bool,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email,
            approved,
        }
    }

    /// Returns the user id of the authenticated subject.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the subject as a stable string, used for audit trails.
    #[must_use]
    pub fn subject(&self) -> String {
        self.user_id.to_string()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if known.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns whether the account has been approved by chapter or branch leadership.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.approved
    }
}
