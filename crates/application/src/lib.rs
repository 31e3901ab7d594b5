//! Application services and ports.

#![forbid(unsafe_code)]

mod assignment_service;
mod audit_ports;
mod authorization_service;
mod branch_service;
mod membership_ports;
mod pagination;
mod rbac_ports;
mod role_service;
mod session_token_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use assignment_service::{
    AssignmentService, BulkGrantOutcome, GrantContext, GrantPolicy, TaxonomyGrantPolicy,
};
pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_service::{AccessRequirement, AuthorizationService, SubjectAccess};
pub use branch_service::BranchService;
pub use membership_ports::{
    BranchFilter, BranchMember, BranchRepository, CreateBranchInput, MemberFilter,
    MembershipPatch, MembershipRepository,
};
pub use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest};
pub use rbac_ports::{
    AssignmentRepository, CreateRoleInput, GrantAssignmentInput, RoleFilter, RoleRepository,
    UpdateRoleInput,
};
pub use role_service::{RoleCategory, RoleService};
pub use session_token_service::{
    DEFAULT_TOKEN_TTL_MINUTES, IssuedToken, SessionTokenRecord, SessionTokenRepository,
    SessionTokenService, TokenService,
};
pub use user_service::{
    NewUserRecord, PasswordHasher, RegisterParams, RegisteredUser, UserFilter, UserListParams,
    UserProfilePatch, UserRecord, UserRepository, UserService, UserStores,
};
