//! Branch scope resolution.

use std::collections::BTreeSet;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{BranchId, ResolvedAssignment, RoleCapability, RoleTaxonomy};

const ALL_SENTINEL: &str = "all";

/// Set of branches a subject may act upon.
///
/// `All` is a sentinel: it is never expanded into the list of existing branches,
/// so callers must handle it through [`AccessibleScope::permits`] or
/// [`AccessibleScope::branch_ids`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessibleScope {
    /// Every branch of the chapter.
    All,
    /// Explicit branch set. May be empty.
    Branches(BTreeSet<BranchId>),
}

impl AccessibleScope {
    /// Empty scope.
    #[must_use]
    pub fn none() -> Self {
        Self::Branches(BTreeSet::new())
    }

    /// Returns whether the scope includes the branch.
    #[must_use]
    pub fn permits(&self, branch_id: BranchId) -> bool {
        match self {
            Self::All => true,
            Self::Branches(branch_ids) => branch_ids.contains(&branch_id),
        }
    }

    /// Returns the explicit branch set, or `None` for the `All` sentinel.
    #[must_use]
    pub fn branch_ids(&self) -> Option<&BTreeSet<BranchId>> {
        match self {
            Self::All => None,
            Self::Branches(branch_ids) => Some(branch_ids),
        }
    }

    /// Returns whether the scope is the `All` sentinel.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Returns whether no branch is reachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Branches(branch_ids) if branch_ids.is_empty())
    }

    /// Transport form: `["all"]` or branch id strings.
    #[must_use]
    pub fn to_transport(&self) -> Vec<String> {
        match self {
            Self::All => vec![ALL_SENTINEL.to_owned()],
            Self::Branches(branch_ids) => branch_ids.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Serialize for AccessibleScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_transport().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AccessibleScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<String>::deserialize(deserializer)?;
        if values.iter().any(|value| value == ALL_SENTINEL) {
            return Ok(Self::All);
        }

        values
            .iter()
            .map(|value| value.parse::<BranchId>().map_err(D::Error::custom))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self::Branches)
    }
}

/// Computes the scope of a subject from its assignments.
///
/// Inactive assignments are ignored. Any active assignment whose role carries
/// [`RoleCapability::ChapterScopeBypass`] yields `All`; otherwise the result is
/// the set of branch ids named by active assignments.
#[must_use]
pub fn resolve_scope(assignments: &[ResolvedAssignment], taxonomy: &RoleTaxonomy) -> AccessibleScope {
    let active = assignments.iter().filter(|assignment| assignment.is_active());

    let bypasses = active.clone().any(|assignment| {
        taxonomy.has_capability(assignment.role_name(), RoleCapability::ChapterScopeBypass)
    });
    if bypasses {
        return AccessibleScope::All;
    }

    AccessibleScope::Branches(active.filter_map(ResolvedAssignment::branch_id).collect())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chapterdesk_core::{NonEmptyString, UserId};
    use chrono::Utc;

    use crate::{
        AssignmentId, BranchId, NewAssignment, PermissionMap, ResolvedAssignment, RoleDefinition,
        RoleId, RoleScopeKind, RoleTaxonomy,
    };

    use super::{AccessibleScope, resolve_scope};

    fn assignment(role_name: &str, branch_id: Option<BranchId>, active: bool) -> ResolvedAssignment {
        let role = RoleDefinition {
            role_id: RoleId::new(),
            name: NonEmptyString::new(role_name).unwrap_or_else(|_| panic!("valid role name")),
            scope_kind: RoleScopeKind::Both,
            category: None,
            description: None,
            permissions: PermissionMap::new(),
            is_active: true,
        };
        let mut stored = NewAssignment {
            subject: UserId::new(),
            role_id: role.role_id,
            chapter_id: None,
            branch_id,
            start_date: Utc::now(),
            end_date: None,
            granted_by: UserId::new(),
            notes: None,
        }
        .into_assignment(AssignmentId::new(), Utc::now());
        stored.is_active = active;

        ResolvedAssignment {
            assignment: stored,
            role,
        }
    }

    #[test]
    fn empty_input_yields_empty_scope() {
        let scope = resolve_scope(&[], &RoleTaxonomy::default());
        assert!(scope.is_empty());
        assert!(!scope.permits(BranchId::new()));
    }

    #[test]
    fn bypass_role_yields_all_sentinel() {
        let branch_id = BranchId::new();
        let scope = resolve_scope(
            &[
                assignment("Branch Secretary", Some(branch_id), true),
                assignment("Chairman", None, true),
            ],
            &RoleTaxonomy::default(),
        );

        assert_eq!(scope, AccessibleScope::All);
        assert_eq!(scope.branch_ids(), None);
        assert!(scope.permits(BranchId::new()));
    }

    #[test]
    fn branch_roles_collect_branch_ids() {
        let first = BranchId::new();
        let second = BranchId::new();
        let scope = resolve_scope(
            &[
                assignment("Branch Secretary", Some(first), true),
                assignment("Branch Chairman", Some(second), true),
                assignment("Treasurer", None, true),
            ],
            &RoleTaxonomy::default(),
        );

        assert_eq!(scope.branch_ids(), Some(&BTreeSet::from([first, second])));
        assert!(scope.permits(first));
        assert!(!scope.permits(BranchId::new()));
    }

    #[test]
    fn inactive_assignments_are_ignored() {
        let branch_id = BranchId::new();
        let scope = resolve_scope(
            &[
                assignment("Chairman", None, false),
                assignment("Branch Secretary", Some(branch_id), true),
            ],
            &RoleTaxonomy::default(),
        );

        assert_eq!(scope, AccessibleScope::Branches(BTreeSet::from([branch_id])));
    }

    #[test]
    fn scope_serializes_sentinel_and_branch_list() {
        let all = serde_json::to_value(AccessibleScope::All).ok();
        assert_eq!(all, Some(serde_json::json!(["all"])));

        let branch_id = BranchId::new();
        let explicit =
            serde_json::to_value(AccessibleScope::Branches(BTreeSet::from([branch_id]))).ok();
        assert_eq!(explicit, Some(serde_json::json!([branch_id.to_string()])));
    }
}
