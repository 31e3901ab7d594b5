use chapterdesk_application::{
    BulkGrantOutcome, CreateRoleInput, GrantAssignmentInput, RoleCategory, RoleFilter,
    UpdateRoleInput,
};
use chapterdesk_core::{AppError, UserId};
use chapterdesk_domain::{
    AccessibleScope, AssignmentPatch, BranchId, ChapterId, EffectivePermissionSet,
    ExecutiveAssignment, PermissionMap, ResolvedAssignment, RoleDefinition, RoleId,
    RoleScopeKind,
};

use crate::error::public_message;

use super::super::common::{format_timestamp, parse_optional_timestamp};
use super::{
    AccessibleScopeResponse, AssignmentResponse, AssignmentSummaryResponse,
    BulkGrantItemResponse, BulkGrantResponse, CreateRoleRequest, EffectivePermissionsResponse,
    GrantAssignmentRequest, RoleCategoryResponse, RoleListQuery, RoleResponse,
    UpdateAssignmentRequest, UpdateRoleRequest,
};

impl TryFrom<RoleListQuery> for RoleFilter {
    type Error = AppError;

    fn try_from(value: RoleListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            scope_kind: value
                .scope_kind
                .as_deref()
                .map(str::parse::<RoleScopeKind>)
                .transpose()?,
            category: value.category,
            include_inactive: false,
        })
    }
}

impl From<RoleDefinition> for RoleResponse {
    fn from(value: RoleDefinition) -> Self {
        Self {
            role_id: value.role_id.to_string(),
            name: value.name.as_str().to_owned(),
            scope_kind: value.scope_kind.as_str().to_owned(),
            category: value.category,
            description: value.description,
            permissions: value.permissions.to_json(),
            is_active: value.is_active,
        }
    }
}

impl From<RoleCategory> for RoleCategoryResponse {
    fn from(value: RoleCategory) -> Self {
        Self {
            name: value.name,
            role_count: value.role_count,
        }
    }
}

impl From<Vec<ResolvedAssignment>> for AssignmentSummaryResponse {
    fn from(assignments: Vec<ResolvedAssignment>) -> Self {
        Self {
            total: assignments.len(),
            assignments: assignments
                .into_iter()
                .map(AssignmentResponse::from)
                .collect(),
        }
    }
}

impl TryFrom<CreateRoleRequest> for CreateRoleInput {
    type Error = AppError;

    fn try_from(value: CreateRoleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            scope_kind: value.scope_kind.parse::<RoleScopeKind>()?,
            category: value.category,
            description: value.description,
            permissions: PermissionMap::from_json(&value.permissions),
        })
    }
}

impl From<UpdateRoleRequest> for UpdateRoleInput {
    fn from(value: UpdateRoleRequest) -> Self {
        Self {
            name: value.name,
            category: value.category,
            description: value.description,
            permissions: value.permissions.as_ref().map(PermissionMap::from_json),
            is_active: value.is_active,
        }
    }
}

impl TryFrom<GrantAssignmentRequest> for GrantAssignmentInput {
    type Error = AppError;

    fn try_from(value: GrantAssignmentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            subject: value.subject.parse::<UserId>()?,
            role_id: value.role_id.parse::<RoleId>()?,
            chapter_id: value
                .chapter_id
                .as_deref()
                .map(str::parse::<ChapterId>)
                .transpose()?,
            branch_id: value
                .branch_id
                .as_deref()
                .map(str::parse::<BranchId>)
                .transpose()?,
            start_date: parse_optional_timestamp("start_date", value.start_date.as_deref())?,
            end_date: parse_optional_timestamp("end_date", value.end_date.as_deref())?,
            notes: value.notes,
        })
    }
}

impl TryFrom<UpdateAssignmentRequest> for AssignmentPatch {
    type Error = AppError;

    fn try_from(value: UpdateAssignmentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            end_date: parse_optional_timestamp("end_date", value.end_date.as_deref())?,
            is_active: value.is_active,
            notes: value.notes,
        })
    }
}

impl From<ExecutiveAssignment> for AssignmentResponse {
    fn from(value: ExecutiveAssignment) -> Self {
        Self {
            assignment_id: value.assignment_id.to_string(),
            subject: value.subject.to_string(),
            role_id: value.role_id.to_string(),
            role_name: None,
            chapter_id: value.chapter_id.map(|id| id.to_string()),
            branch_id: value.branch_id.map(|id| id.to_string()),
            start_date: format_timestamp(value.start_date),
            end_date: value.end_date.map(format_timestamp),
            is_active: value.is_active,
            granted_by: value.granted_by.to_string(),
            notes: value.notes,
            created_at: format_timestamp(value.created_at),
            updated_at: format_timestamp(value.updated_at),
        }
    }
}

impl From<ResolvedAssignment> for AssignmentResponse {
    fn from(value: ResolvedAssignment) -> Self {
        let role_name = value.role_name().to_owned();
        let mut response = Self::from(value.assignment);
        response.role_name = Some(role_name);
        response
    }
}

impl From<Vec<BulkGrantOutcome>> for BulkGrantResponse {
    fn from(outcomes: Vec<BulkGrantOutcome>) -> Self {
        let results: Vec<BulkGrantItemResponse> = outcomes
            .into_iter()
            .enumerate()
            .map(|(position, outcome)| match outcome {
                BulkGrantOutcome::Granted(assignment) => BulkGrantItemResponse {
                    index: position,
                    granted: true,
                    assignment: Some(assignment.into()),
                    error: None,
                },
                BulkGrantOutcome::Failed { index, error } => BulkGrantItemResponse {
                    index,
                    granted: false,
                    assignment: None,
                    error: Some(public_message(&error)),
                },
            })
            .collect();
        let granted = results.iter().filter(|item| item.granted).count();

        Self {
            granted,
            failed: results.len() - granted,
            results,
        }
    }
}

impl From<&EffectivePermissionSet> for EffectivePermissionsResponse {
    fn from(value: &EffectivePermissionSet) -> Self {
        Self {
            permissions: value.to_transport(),
        }
    }
}

impl From<&AccessibleScope> for AccessibleScopeResponse {
    fn from(value: &AccessibleScope) -> Self {
        Self {
            scope: value.to_transport(),
            is_all: value.is_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chapterdesk_application::{BulkGrantOutcome, CreateRoleInput, GrantAssignmentInput};
    use chapterdesk_core::{AppError, UserId};
    use chapterdesk_domain::{AssignmentId, NewAssignment, RoleId};
    use chrono::Utc;
    use serde_json::json;

    use super::super::{BulkGrantResponse, CreateRoleRequest, GrantAssignmentRequest};

    fn grant_request(subject: &str) -> GrantAssignmentRequest {
        GrantAssignmentRequest {
            subject: subject.to_owned(),
            role_id: RoleId::new().to_string(),
            chapter_id: None,
            branch_id: None,
            start_date: None,
            end_date: None,
            notes: None,
        }
    }

    #[test]
    fn create_role_request_decodes_permissions_leniently() {
        let request = CreateRoleRequest {
            name: "Welfare Officer".to_owned(),
            scope_kind: "branch".to_owned(),
            category: None,
            description: None,
            permissions: json!({"members": ["read"], "events": true, "noise": 42}),
        };

        let input = CreateRoleInput::try_from(request);
        let input = input.unwrap_or_else(|error| panic!("conversion failed: {error}"));
        assert!(input.permissions.get("members").is_some_and(|grant| grant.allows("read")));
        assert!(input.permissions.get("events").is_some_and(|grant| grant.is_all()));
        assert!(!input.permissions.get("noise").is_some_and(|grant| grant.allows("read")));
    }

    #[test]
    fn unknown_scope_kind_is_rejected() {
        let request = CreateRoleRequest {
            name: "Welfare Officer".to_owned(),
            scope_kind: "region".to_owned(),
            category: None,
            description: None,
            permissions: json!({}),
        };

        assert!(matches!(
            CreateRoleInput::try_from(request),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn malformed_grant_identifiers_are_rejected() {
        assert!(matches!(
            GrantAssignmentInput::try_from(grant_request("not-a-uuid")),
            Err(AppError::Validation(_))
        ));

        let mut request = grant_request(&UserId::new().to_string());
        request.start_date = Some("next tuesday".to_owned());
        assert!(matches!(
            GrantAssignmentInput::try_from(request),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn bulk_response_counts_outcomes() {
        let assignment = NewAssignment {
            subject: UserId::new(),
            role_id: RoleId::new(),
            chapter_id: None,
            branch_id: None,
            start_date: Utc::now(),
            end_date: None,
            granted_by: UserId::new(),
            notes: None,
        }
        .into_assignment(AssignmentId::new(), Utc::now());

        let response = BulkGrantResponse::from(vec![
            BulkGrantOutcome::Granted(assignment),
            BulkGrantOutcome::Failed {
                index: 1,
                error: AppError::Conflict("already holds role".to_owned()),
            },
        ]);

        assert_eq!(response.granted, 1);
        assert_eq!(response.failed, 1);
        assert_eq!(response.results[1].index, 1);
        assert!(
            response.results[1]
                .error
                .as_deref()
                .is_some_and(|message| message.contains("already holds role"))
        );
    }
}
