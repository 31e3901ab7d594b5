//! User accounts: registration, login, approval status.
//!
//! Login failures are reported with one generic message whatever the cause,
//! and the password hasher runs even for unknown emails.

mod login;
mod registration;
mod retrieval;
mod status;


use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use chapterdesk_core::{AppResult, NonEmptyString, UserId};
use chapterdesk_domain::{BranchId, EmailAddress, Membership, UserAccount, UserStatus};

use crate::{
    AuditRepository, AuthorizationService, BranchRepository, MembershipRepository, Page,
    PageRequest, TokenService,
};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// User row including the credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Account fields.
    pub account: UserAccount,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// Validated payload for persisting a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Login email.
    pub email: EmailAddress,
    /// Display name.
    pub full_name: NonEmptyString,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Initial status.
    pub status: UserStatus,
    /// Allocated membership number.
    pub membership_number: String,
    /// Branch of the pending membership stored together with the account.
    pub initial_branch: Option<BranchId>,
}

/// Account and initial membership persisted by one registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    /// Stored account.
    pub account: UserAccount,
    /// Pending membership, when an initial branch was requested.
    pub membership: Option<Membership>,
}

/// Profile fields a user may change on their own account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfilePatch {
    /// New display name.
    pub full_name: Option<NonEmptyString>,
}

impl UserProfilePatch {
    /// Returns whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
    }
}

/// Filter for user listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Restrict to one approval status.
    pub status: Option<UserStatus>,
    /// Restrict to members of these branches. `None` applies no restriction.
    pub branch_ids: Option<BTreeSet<BranchId>>,
    /// Case-insensitive match on full name or membership number.
    pub search: Option<String>,
    /// Requested page.
    pub page: PageRequest,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by normalized email.
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserRecord>>;

    /// Finds a user by id.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Allocates the next membership sequence number for the year.
    async fn next_membership_sequence(&self, year: i32) -> AppResult<u64>;

    /// Persists a new user and, when requested, its pending membership as one
    /// atomic write. Fails with `Conflict` when the email is taken.
    async fn create_user(&self, user: NewUserRecord) -> AppResult<RegisteredUser>;

    /// Lists users matching the filter, ordered by full name.
    async fn list_users(&self, filter: &UserFilter) -> AppResult<Page<UserAccount>>;

    /// Applies profile changes. Returns `None` for unknown users.
    async fn update_profile(
        &self,
        user_id: UserId,
        patch: &UserProfilePatch,
    ) -> AppResult<Option<UserAccount>>;

    /// Updates the approval status. Returns `None` for unknown users.
    async fn update_status(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> AppResult<Option<UserAccount>>;
}

/// Port for password hashing. Keeps the application free of direct
/// cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Parameters for self-registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterParams {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Display name.
    pub full_name: String,
    /// Branch the user applies to join.
    pub branch_id: BranchId,
}

/// Parameters for listing users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListParams {
    /// Restrict to one approval status.
    pub status: Option<UserStatus>,
    /// Restrict to one branch. Must lie in the caller's scope.
    pub branch_id: Option<BranchId>,
    /// Case-insensitive match on full name or membership number.
    pub search: Option<String>,
    /// Requested page.
    pub page: PageRequest,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Repositories the user service persists through.
#[derive(Clone)]
pub struct UserStores {
    /// User accounts.
    pub users: Arc<dyn UserRepository>,
    /// Branches, for registration checks.
    pub branches: Arc<dyn BranchRepository>,
    /// Branch memberships.
    pub memberships: Arc<dyn MembershipRepository>,
    /// Audit sink.
    pub audit: Arc<dyn AuditRepository>,
}

/// Application service for user accounts and authentication.
#[derive(Clone)]
pub struct UserService {
    stores: UserStores,
    password_hasher: Arc<dyn PasswordHasher>,
    token_service: Arc<dyn TokenService>,
    authorization_service: AuthorizationService,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        stores: UserStores,
        password_hasher: Arc<dyn PasswordHasher>,
        token_service: Arc<dyn TokenService>,
        authorization_service: AuthorizationService,
    ) -> Self {
        Self {
            stores,
            password_hasher,
            token_service,
            authorization_service,
        }
    }
}
