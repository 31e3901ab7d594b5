use chapterdesk_core::{AppError, AppResult, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AssignmentId, BranchId, ChapterId, RoleDefinition, RoleId};

/// Grant of one role to one subject, optionally scoped to a chapter and/or branch.
///
/// Assignments reference their role by id and are never hard-deleted: revoking
/// one clears `is_active` and stamps `end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveAssignment {
    /// Stable assignment identifier.
    pub assignment_id: AssignmentId,
    /// Subject holding the role.
    pub subject: UserId,
    /// Granted role.
    pub role_id: RoleId,
    /// Chapter scope, if any.
    pub chapter_id: Option<ChapterId>,
    /// Branch scope, if any.
    pub branch_id: Option<BranchId>,
    /// Start of the term.
    pub start_date: DateTime<Utc>,
    /// End of the term, if known or revoked.
    pub end_date: Option<DateTime<Utc>>,
    /// Whether the assignment currently confers its role.
    pub is_active: bool,
    /// Subject who granted the assignment.
    pub granted_by: UserId,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validated payload for persisting a new active assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    /// Subject receiving the role.
    pub subject: UserId,
    /// Granted role.
    pub role_id: RoleId,
    /// Chapter scope, if any.
    pub chapter_id: Option<ChapterId>,
    /// Branch scope, if any.
    pub branch_id: Option<BranchId>,
    /// Start of the term.
    pub start_date: DateTime<Utc>,
    /// Planned end of the term.
    pub end_date: Option<DateTime<Utc>>,
    /// Subject granting the role.
    pub granted_by: UserId,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl NewAssignment {
    /// Checks the payload against the role it grants.
    pub fn validate_for_role(&self, role: &RoleDefinition) -> AppResult<()> {
        if self.role_id != role.role_id {
            return Err(AppError::Validation(format!(
                "assignment references role '{}' but was validated against '{}'",
                self.role_id, role.role_id
            )));
        }

        if role.scope_kind.requires_branch() && self.branch_id.is_none() {
            return Err(AppError::Validation(format!(
                "role '{}' is branch-scoped and requires a branch id",
                role.name()
            )));
        }

        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                return Err(AppError::Validation(
                    "assignment end date must not precede its start date".to_owned(),
                ));
            }
        }

        Ok(())
    }

    /// Materializes the stored record.
    #[must_use]
    pub fn into_assignment(
        self,
        assignment_id: AssignmentId,
        now: DateTime<Utc>,
    ) -> ExecutiveAssignment {
        ExecutiveAssignment {
            assignment_id,
            subject: self.subject,
            role_id: self.role_id,
            chapter_id: self.chapter_id,
            branch_id: self.branch_id,
            start_date: self.start_date,
            end_date: self.end_date,
            is_active: true,
            granted_by: self.granted_by,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of an assignment. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentPatch {
    /// New end date.
    pub end_date: Option<DateTime<Utc>>,
    /// New active flag.
    pub is_active: Option<bool>,
    /// New notes.
    pub notes: Option<String>,
}

impl AssignmentPatch {
    /// Patch that deactivates an assignment at `now`.
    #[must_use]
    pub fn revocation(now: DateTime<Utc>) -> Self {
        Self {
            end_date: Some(now),
            is_active: Some(false),
            notes: None,
        }
    }

    /// Returns whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end_date.is_none() && self.is_active.is_none() && self.notes.is_none()
    }

    /// Returns whether applying the patch turns an inactive assignment active again.
    #[must_use]
    pub fn reactivates(&self, current: &ExecutiveAssignment) -> bool {
        !current.is_active && self.is_active == Some(true)
    }

    /// Checks the patch against the stored assignment it will be applied to.
    pub fn validate_against(&self, current: &ExecutiveAssignment) -> AppResult<()> {
        match self.end_date {
            Some(end_date) if end_date < current.start_date => Err(AppError::Validation(
                "assignment end date must not precede its start date".to_owned(),
            )),
            _ => Ok(()),
        }
    }

    /// Applies the provided fields to the assignment.
    pub fn apply_to(&self, assignment: &mut ExecutiveAssignment, now: DateTime<Utc>) {
        if let Some(end_date) = self.end_date {
            assignment.end_date = Some(end_date);
        }
        if let Some(is_active) = self.is_active {
            assignment.is_active = is_active;
        }
        if let Some(notes) = &self.notes {
            assignment.notes = Some(notes.clone());
        }
        assignment.updated_at = now;
    }
}

/// Assignment joined with the role it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAssignment {
    /// Stored assignment.
    pub assignment: ExecutiveAssignment,
    /// Referenced role definition.
    pub role: RoleDefinition,
}

impl ResolvedAssignment {
    /// Returns the role name.
    #[must_use]
    pub fn role_name(&self) -> &str {
        self.role.name()
    }

    /// Returns whether the assignment is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.assignment.is_active
    }

    /// Returns the branch scope of the assignment.
    #[must_use]
    pub fn branch_id(&self) -> Option<BranchId> {
        self.assignment.branch_id
    }
}

#[cfg(test)]
mod tests {
    use chapterdesk_core::{AppError, NonEmptyString, UserId};
    use chrono::{Duration, Utc};

    use crate::{AssignmentId, BranchId, PermissionMap, RoleDefinition, RoleId, RoleScopeKind};

    use super::{AssignmentPatch, NewAssignment};

    fn branch_role() -> RoleDefinition {
        RoleDefinition {
            role_id: RoleId::new(),
            name: NonEmptyString::new("Branch Secretary")
                .unwrap_or_else(|_| panic!("valid role name")),
            scope_kind: RoleScopeKind::Branch,
            category: None,
            description: None,
            permissions: PermissionMap::new(),
            is_active: true,
        }
    }

    fn new_assignment(role: &RoleDefinition, branch_id: Option<BranchId>) -> NewAssignment {
        NewAssignment {
            subject: UserId::new(),
            role_id: role.role_id,
            chapter_id: None,
            branch_id,
            start_date: Utc::now(),
            end_date: None,
            granted_by: UserId::new(),
            notes: None,
        }
    }

    #[test]
    fn branch_role_requires_branch_id() {
        let role = branch_role();
        let result = new_assignment(&role, None).validate_for_role(&role);
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = new_assignment(&role, Some(BranchId::new())).validate_for_role(&role);
        assert!(result.is_ok());
    }

    #[test]
    fn end_date_before_start_is_rejected() {
        let role = branch_role();
        let mut assignment = new_assignment(&role, Some(BranchId::new()));
        assignment.end_date = Some(assignment.start_date - Duration::days(1));

        assert!(assignment.validate_for_role(&role).is_err());
    }

    #[test]
    fn revocation_patch_deactivates_and_stamps_end_date() {
        let role = branch_role();
        let now = Utc::now();
        let mut assignment =
            new_assignment(&role, Some(BranchId::new())).into_assignment(AssignmentId::new(), now);

        AssignmentPatch::revocation(now).apply_to(&mut assignment, now);

        assert!(!assignment.is_active);
        assert_eq!(assignment.end_date, Some(now));
    }

    #[test]
    fn patch_end_date_before_start_is_rejected() {
        let role = branch_role();
        let now = Utc::now();
        let assignment =
            new_assignment(&role, Some(BranchId::new())).into_assignment(AssignmentId::new(), now);

        let early = AssignmentPatch {
            end_date: Some(now - Duration::days(30)),
            ..AssignmentPatch::default()
        };
        assert!(matches!(
            early.validate_against(&assignment),
            Err(AppError::Validation(_))
        ));
        assert!(AssignmentPatch::revocation(now).validate_against(&assignment).is_ok());
    }

    #[test]
    fn patch_leaves_absent_fields_untouched() {
        let role = branch_role();
        let now = Utc::now();
        let mut assignment =
            new_assignment(&role, Some(BranchId::new())).into_assignment(AssignmentId::new(), now);

        AssignmentPatch {
            notes: Some("re-elected".to_owned()),
            ..AssignmentPatch::default()
        }
        .apply_to(&mut assignment, now);

        assert!(assignment.is_active);
        assert_eq!(assignment.end_date, None);
        assert_eq!(assignment.notes.as_deref(), Some("re-elected"));
    }
}
