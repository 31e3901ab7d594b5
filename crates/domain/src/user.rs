//! User domain types and validation rules.

use std::str::FromStr;

use chapterdesk_core::{AppError, AppResult, NonEmptyString, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated, lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Requires exactly one `@`, a non-empty local part and a dotted domain.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let normalized = value.into().trim().to_lowercase();

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        if normalized.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain an '@'".to_owned(),
            ));
        };

        if local.is_empty() || domain.contains('@') {
            return Err(AppError::Validation(
                "email address must have one '@' and a non-empty local part".to_owned(),
            ));
        }

        let dotted = domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2;
        if !dotted || domain.starts_with('.') || domain.ends_with('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Minimum password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum password length. Bounds Argon2 work per login attempt.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validates a plaintext password.
///
/// Passwords need 8 to 128 characters with at least one uppercase letter,
/// one lowercase letter and one digit, and must not be a commonly breached value.
pub fn validate_password(password: &str) -> AppResult<()> {
    let char_count = password.chars().count();

    if char_count < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    if !password.chars().any(char::is_uppercase) {
        return Err(AppError::Validation(
            "password must contain at least one uppercase letter".to_owned(),
        ));
    }

    if !password.chars().any(char::is_lowercase) {
        return Err(AppError::Validation(
            "password must contain at least one lowercase letter".to_owned(),
        ));
    }

    if !password.chars().any(|character| character.is_ascii_digit()) {
        return Err(AppError::Validation(
            "password must contain at least one digit".to_owned(),
        ));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err(AppError::Validation(
            "this password is too common and has appeared in data breaches".to_owned(),
        ));
    }

    Ok(())
}

static COMMON_PASSWORDS: &[&str] = &[
    "password1",
    "password12",
    "password123",
    "passw0rd",
    "qwerty123",
    "qwerty12",
    "welcome1",
    "welcome123",
    "letmein1",
    "abc12345",
    "abcd1234",
    "iloveyou1",
    "sunshine1",
    "football1",
    "baseball1",
    "princess1",
    "monkey123",
    "dragon123",
    "admin123",
    "changeme1",
];

/// Account approval lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Rejected or never submitted for approval.
    NotApproved,
    /// Registered and waiting for a leader to approve.
    PendingApproval,
    /// Full member.
    Approved,
    /// Temporarily barred.
    Suspended,
    /// Membership lapsed.
    Expired,
}

impl UserStatus {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotApproved => "not_approved",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Suspended => "suspended",
            Self::Expired => "expired",
        }
    }
}

impl FromStr for UserStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "not_approved" => Ok(Self::NotApproved),
            "pending_approval" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "suspended" => Ok(Self::Suspended),
            "expired" => Ok(Self::Expired),
            _ => Err(AppError::Validation(format!(
                "unknown user status '{value}'"
            ))),
        }
    }
}

/// Formats a membership number as `NDC-{year}-{sequence:04}`.
#[must_use]
pub fn format_membership_number(year: i32, sequence: u64) -> String {
    format!("NDC-{year}-{sequence:04}")
}

/// Registered user account, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Stable user identifier.
    pub user_id: UserId,
    /// Login email.
    pub email: EmailAddress,
    /// Display name.
    pub full_name: NonEmptyString,
    /// Approval status.
    pub status: UserStatus,
    /// Membership number assigned at registration.
    pub membership_number: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    /// Returns whether the account may use member-only resources.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == UserStatus::Approved
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{
        EmailAddress, PASSWORD_MAX_LENGTH, UserStatus, format_membership_number, validate_password,
    };

    #[test]
    fn valid_email_is_normalized() {
        let email = EmailAddress::new("  Ada@Example.ORG ");
        assert_eq!(
            email.map(String::from).ok(),
            Some("ada@example.org".to_owned())
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for value in ["", "no-at-sign", "@example.org", "a@b@example.org", "ada@nodot", "ada@.org"] {
            assert!(EmailAddress::new(value).is_err(), "accepted {value}");
        }
    }

    #[test]
    fn password_character_classes_are_required() {
        assert!(validate_password("Short1").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
        assert!(validate_password("Branch2024Rally").is_ok());
    }

    #[test]
    fn common_password_is_rejected() {
        assert!(validate_password("Password123").is_err());
    }

    #[test]
    fn password_length_is_bounded() {
        let long = format!("Aa1{}", "b".repeat(PASSWORD_MAX_LENGTH));
        assert!(validate_password(&long).is_err());
    }

    #[test]
    fn membership_number_is_zero_padded() {
        assert_eq!(format_membership_number(2026, 7), "NDC-2026-0007");
        assert_eq!(format_membership_number(2026, 12345), "NDC-2026-12345");
    }

    #[test]
    fn user_status_roundtrip_storage_value() {
        for status in [
            UserStatus::NotApproved,
            UserStatus::PendingApproval,
            UserStatus::Approved,
            UserStatus::Suspended,
            UserStatus::Expired,
        ] {
            assert_eq!(UserStatus::from_str(status.as_str()).ok(), Some(status));
        }
    }
}
