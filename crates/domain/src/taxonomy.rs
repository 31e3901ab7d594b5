//! Role taxonomy: the configuration table mapping role names to capabilities.
//!
//! Authorization rules ask the taxonomy which roles carry a capability instead of
//! comparing role names inline, so renaming or adding executive roles is a
//! configuration change.

use std::collections::{BTreeMap, BTreeSet};

use chapterdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Capability a role name can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCapability {
    /// May grant executive assignments.
    AssignRoles,
    /// Acts on every branch without branch enumeration.
    ChapterScopeBypass,
    /// May update or revoke any assignment.
    ManageAssignments,
    /// May update or revoke assignments in the branch the role is held in.
    ManageBranchAssignments,
    /// May view other subjects' assignments.
    ViewAssignments,
    /// May approve branch memberships.
    ApproveMembers,
    /// Member of the chapter leadership.
    ChapterLeadership,
    /// Member of a branch leadership.
    BranchLeadership,
}

/// Role name to capability table, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTaxonomy {
    roles: BTreeMap<String, BTreeSet<RoleCapability>>,
}

impl RoleTaxonomy {
    /// Creates a taxonomy from explicit entries.
    #[must_use]
    pub fn new<I, N, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: IntoIterator<Item = RoleCapability>,
    {
        Self {
            roles: entries
                .into_iter()
                .map(|(name, capabilities)| (name.into(), capabilities.into_iter().collect()))
                .collect(),
        }
    }

    /// Parses a taxonomy document of the form `{"roles": {"Chairman": ["assign_roles"]}}`.
    pub fn from_json_str(document: &str) -> AppResult<Self> {
        let taxonomy: Self = serde_json::from_str(document).map_err(|error| {
            AppError::Validation(format!("invalid role taxonomy document: {error}"))
        })?;

        if taxonomy.roles.keys().any(|name| name.trim().is_empty()) {
            return Err(AppError::Validation(
                "role taxonomy must not contain empty role names".to_owned(),
            ));
        }

        Ok(taxonomy)
    }

    /// Returns whether the role name carries the capability.
    #[must_use]
    pub fn has_capability(&self, role_name: &str, capability: RoleCapability) -> bool {
        self.roles
            .get(role_name)
            .is_some_and(|capabilities| capabilities.contains(&capability))
    }

    /// Returns every role name carrying the capability.
    #[must_use]
    pub fn roles_with(&self, capability: RoleCapability) -> BTreeSet<String> {
        self.roles
            .iter()
            .filter(|(_, capabilities)| capabilities.contains(&capability))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Returns chapter and branch leadership role names together.
    #[must_use]
    pub fn any_leadership(&self) -> BTreeSet<String> {
        let mut names = self.roles_with(RoleCapability::ChapterLeadership);
        names.extend(self.roles_with(RoleCapability::BranchLeadership));
        names
    }
}

impl Default for RoleTaxonomy {
    fn default() -> Self {
        use RoleCapability::{
            ApproveMembers, AssignRoles, BranchLeadership, ChapterLeadership, ChapterScopeBypass,
            ManageAssignments, ManageBranchAssignments, ViewAssignments,
        };

        let chapter_officer = [
            AssignRoles,
            ChapterScopeBypass,
            ManageAssignments,
            ViewAssignments,
            ApproveMembers,
            ChapterLeadership,
        ];
        let branch_officer = [
            ManageBranchAssignments,
            ViewAssignments,
            ApproveMembers,
            BranchLeadership,
        ];

        Self::new([
            ("Chairman", chapter_officer.to_vec()),
            ("Secretary", chapter_officer.to_vec()),
            ("Vice Chairman", vec![ChapterScopeBypass, ChapterLeadership]),
            ("Branch Chairman", branch_officer.to_vec()),
            ("Branch Secretary", branch_officer.to_vec()),
        ])
    }
}
