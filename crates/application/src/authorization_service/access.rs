use std::collections::BTreeSet;

use chapterdesk_core::UserId;
use chapterdesk_domain::{
    AccessibleScope, BranchId, EffectivePermissionSet, ResolvedAssignment, RoleCapability,
    RoleTaxonomy,
};

/// Access of one subject, derived from its active assignments at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAccess {
    /// Subject the access belongs to.
    pub subject: UserId,
    /// Active assignments whose roles are active.
    pub assignments: Vec<ResolvedAssignment>,
    /// Merged permissions of those roles.
    pub permissions: EffectivePermissionSet,
    /// Branches the subject may act upon.
    pub scope: AccessibleScope,
}

impl SubjectAccess {
    /// Returns whether any assignment's role name is in the set.
    #[must_use]
    pub fn holds_any_role(&self, role_names: &BTreeSet<String>) -> bool {
        self.assignments
            .iter()
            .any(|assignment| role_names.contains(assignment.role_name()))
    }

    /// Returns whether any held role carries the capability.
    #[must_use]
    pub fn has_capability(&self, taxonomy: &RoleTaxonomy, capability: RoleCapability) -> bool {
        self.assignments
            .iter()
            .any(|assignment| taxonomy.has_capability(assignment.role_name(), capability))
    }

    /// Returns whether a role carrying the capability is held in the given branch.
    #[must_use]
    pub fn has_capability_in_branch(
        &self,
        taxonomy: &RoleTaxonomy,
        capability: RoleCapability,
        branch_id: BranchId,
    ) -> bool {
        self.assignments.iter().any(|assignment| {
            assignment.branch_id() == Some(branch_id)
                && taxonomy.has_capability(assignment.role_name(), capability)
        })
    }
}
