use chapterdesk_core::UserId;
use chapterdesk_domain::{BranchId, ChapterId, PermissionMap, RoleId, RoleScopeKind};
use chrono::{DateTime, Utc};

/// Filter for role catalog queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleFilter {
    /// Restrict to one scope kind.
    pub scope_kind: Option<RoleScopeKind>,
    /// Restrict to one category.
    pub category: Option<String>,
    /// Include deactivated roles.
    pub include_inactive: bool,
}

/// Input payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Level the role applies to.
    pub scope_kind: RoleScopeKind,
    /// Optional grouping.
    pub category: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Grants carried by the role.
    pub permissions: PermissionMap,
}

/// Input payload for updating a role. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New name.
    pub name: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Replacement grants.
    pub permissions: Option<PermissionMap>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Input payload for granting a role to a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantAssignmentInput {
    /// Subject receiving the role.
    pub subject: UserId,
    /// Role to grant.
    pub role_id: RoleId,
    /// Chapter scope.
    pub chapter_id: Option<ChapterId>,
    /// Branch scope. Required for branch-kind roles.
    pub branch_id: Option<BranchId>,
    /// Start of the term. Defaults to now.
    pub start_date: Option<DateTime<Utc>>,
    /// Planned end of the term.
    pub end_date: Option<DateTime<Utc>>,
    /// Free-form notes.
    pub notes: Option<String>,
}
