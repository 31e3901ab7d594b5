use std::str::FromStr;

use chapterdesk_core::{AppError, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{PermissionMap, RoleId};

/// Organizational level a role is meaningful at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScopeKind {
    /// Chapter-wide role.
    Chapter,
    /// Role held within one branch. Assignments must name the branch.
    Branch,
    /// Role that can be held at either level.
    Both,
}

impl RoleScopeKind {
    /// Returns a stable storage value for this scope kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chapter => "chapter",
            Self::Branch => "branch",
            Self::Both => "both",
        }
    }

    /// Returns whether assignments of this kind must carry a branch id.
    #[must_use]
    pub fn requires_branch(&self) -> bool {
        matches!(self, Self::Branch)
    }
}

impl FromStr for RoleScopeKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "chapter" => Ok(Self::Chapter),
            "branch" => Ok(Self::Branch),
            "both" => Ok(Self::Both),
            _ => Err(AppError::Validation(format!(
                "unknown role scope kind '{value}'"
            ))),
        }
    }
}

/// Named capability template that executive assignments reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Stable role identifier.
    pub role_id: RoleId,
    /// Unique human-readable name, e.g. "Chairman".
    pub name: NonEmptyString,
    /// Level the role applies to.
    pub scope_kind: RoleScopeKind,
    /// Optional grouping such as "Executive" or "Committee".
    pub category: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Grants carried by the role.
    pub permissions: PermissionMap,
    /// Inactive roles are ignored when computing access.
    pub is_active: bool,
}

impl RoleDefinition {
    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}
