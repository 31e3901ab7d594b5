//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod assignment;
mod branch;
mod ids;
mod membership;
mod permission;
mod role;
mod scope;
mod security;
mod taxonomy;
mod user;

pub use assignment::{AssignmentPatch, ExecutiveAssignment, NewAssignment, ResolvedAssignment};
pub use branch::{BranchDefinition, BranchPatch, BranchStatus, DEFAULT_MIN_MEMBERS};
pub use ids::{AssignmentId, BranchId, ChapterId, MembershipId, RoleId};
pub use membership::{Membership, MembershipStatus};
pub use permission::{EffectivePermissionSet, PermissionGrant, PermissionMap, actions};
pub use role::{RoleDefinition, RoleScopeKind};
pub use scope::{AccessibleScope, resolve_scope};
pub use security::AuditAction;
pub use taxonomy::{RoleCapability, RoleTaxonomy};
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserAccount, UserStatus,
    format_membership_number, validate_password,
};
