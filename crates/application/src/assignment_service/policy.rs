use std::sync::Arc;

use chapterdesk_core::UserId;
use chapterdesk_domain::{BranchId, ChapterId, RoleCapability, RoleDefinition, RoleTaxonomy};

use crate::SubjectAccess;

/// Grant being authorized.
#[derive(Debug, Clone, Copy)]
pub struct GrantContext<'a> {
    /// Subject receiving the role.
    pub subject: UserId,
    /// Role being granted.
    pub role: &'a RoleDefinition,
    /// Chapter scope of the grant.
    pub chapter_id: Option<ChapterId>,
    /// Branch scope of the grant.
    pub branch_id: Option<BranchId>,
}

/// Decides whether a grantor may create an assignment.
pub trait GrantPolicy: Send + Sync {
    /// Returns whether the grantor may grant any role at all.
    ///
    /// Checked before the requested role is looked up, so callers without
    /// authority learn nothing about the role catalog.
    fn may_grant(&self, grantor: &SubjectAccess) -> bool;

    /// Returns whether the grantor may grant the role as described.
    fn can_grant(&self, grantor: &SubjectAccess, grant: &GrantContext<'_>) -> bool;
}

/// Grant policy allowing holders of a role with the `assign_roles` capability.
#[derive(Debug, Clone)]
pub struct TaxonomyGrantPolicy {
    taxonomy: Arc<RoleTaxonomy>,
}

impl TaxonomyGrantPolicy {
    /// Creates a policy over the taxonomy.
    #[must_use]
    pub fn new(taxonomy: Arc<RoleTaxonomy>) -> Self {
        Self { taxonomy }
    }
}

impl GrantPolicy for TaxonomyGrantPolicy {
    fn may_grant(&self, grantor: &SubjectAccess) -> bool {
        grantor.has_capability(&self.taxonomy, RoleCapability::AssignRoles)
    }

    fn can_grant(&self, grantor: &SubjectAccess, _grant: &GrantContext<'_>) -> bool {
        self.may_grant(grantor)
    }
}
