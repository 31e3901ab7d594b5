use std::str::FromStr;

use chapterdesk_core::{AppError, AppResult, NonEmptyString, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BranchId, ChapterId};

/// Default minimum member count for a branch.
pub const DEFAULT_MIN_MEMBERS: u32 = 20;

/// Branch lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchStatus {
    /// Open for members.
    Active,
    /// Closed. Kept for history.
    Inactive,
    /// Proposed and awaiting approval.
    Pending,
}

impl BranchStatus {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
        }
    }
}

impl FromStr for BranchStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "pending" => Ok(Self::Pending),
            _ => Err(AppError::Validation(format!(
                "unknown branch status '{value}'"
            ))),
        }
    }
}

/// Sub-unit of a chapter that members belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchDefinition {
    /// Stable branch identifier.
    pub branch_id: BranchId,
    /// Owning chapter.
    pub chapter_id: ChapterId,
    /// Name, unique within the chapter.
    pub name: NonEmptyString,
    /// Location label.
    pub location: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
    /// Minimum member count.
    pub min_members: u32,
    /// Lifecycle state.
    pub status: BranchStatus,
    /// Creator, if recorded.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl BranchDefinition {
    /// Returns whether the branch accepts registrations.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == BranchStatus::Active
    }
}

/// Partial branch update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchPatch {
    /// New name.
    pub name: Option<NonEmptyString>,
    /// New location.
    pub location: Option<NonEmptyString>,
    /// New description.
    pub description: Option<String>,
    /// New minimum member count.
    pub min_members: Option<u32>,
    /// New status.
    pub status: Option<BranchStatus>,
}

impl BranchPatch {
    /// Applies the provided fields.
    pub fn apply_to(&self, branch: &mut BranchDefinition, now: DateTime<Utc>) -> AppResult<()> {
        if self.min_members == Some(0) {
            return Err(AppError::Validation(
                "branch minimum members must be at least 1".to_owned(),
            ));
        }

        if let Some(name) = &self.name {
            branch.name = name.clone();
        }
        if let Some(location) = &self.location {
            branch.location = location.clone();
        }
        if let Some(description) = &self.description {
            branch.description = Some(description.clone());
        }
        if let Some(min_members) = self.min_members {
            branch.min_members = min_members;
        }
        if let Some(status) = self.status {
            branch.status = status;
        }
        branch.updated_at = now;

        Ok(())
    }
}
