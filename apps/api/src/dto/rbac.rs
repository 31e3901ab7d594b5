use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

mod conversions;

/// Query string for role listings.
#[derive(Debug, Default, Deserialize)]
pub struct RoleListQuery {
    pub scope_kind: Option<String>,
    pub category: Option<String>,
}

/// API representation of a role definition.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
    pub scope_kind: String,
    pub category: Option<String>,
    pub description: Option<String>,
    #[ts(type = "Record<string, Array<string> | \"all\">")]
    pub permissions: Value,
    pub is_active: bool,
}

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    pub scope_kind: String,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub permissions: Value,
}

/// Incoming payload for role updates. Absent fields are left unchanged.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[ts(type = "Record<string, unknown> | null")]
    pub permissions: Option<Value>,
    pub is_active: Option<bool>,
}

/// Category label with the number of active roles carrying it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-category-response.ts"
)]
pub struct RoleCategoryResponse {
    pub name: String,
    pub role_count: usize,
}

/// Query string for assignment listings.
#[derive(Debug, Default, Deserialize)]
pub struct AssignmentListQuery {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

fn default_active_only() -> bool {
    true
}

/// Incoming payload for an executive role grant.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grant-assignment-request.ts"
)]
pub struct GrantAssignmentRequest {
    pub subject: String,
    pub role_id: String,
    pub chapter_id: Option<String>,
    pub branch_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub notes: Option<String>,
}

/// Incoming payload for granting several assignments in one request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-grant-request.ts"
)]
pub struct BulkGrantRequest {
    pub assignments: Vec<GrantAssignmentRequest>,
}

/// Incoming payload for assignment updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-assignment-request.ts"
)]
pub struct UpdateAssignmentRequest {
    pub end_date: Option<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

/// API representation of an executive assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assignment-response.ts"
)]
pub struct AssignmentResponse {
    pub assignment_id: String,
    pub subject: String,
    pub role_id: String,
    pub role_name: Option<String>,
    pub chapter_id: Option<String>,
    pub branch_id: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_active: bool,
    pub granted_by: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Outcome of one bulk grant item.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-grant-item-response.ts"
)]
pub struct BulkGrantItemResponse {
    pub index: usize,
    pub granted: bool,
    pub assignment: Option<AssignmentResponse>,
    pub error: Option<String>,
}

/// Per-item results of a bulk grant.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-grant-response.ts"
)]
pub struct BulkGrantResponse {
    pub granted: usize,
    pub failed: usize,
    pub results: Vec<BulkGrantItemResponse>,
}

/// Merged permissions of the caller's active roles.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/effective-permissions-response.ts"
)]
pub struct EffectivePermissionsResponse {
    pub permissions: BTreeMap<String, Vec<String>>,
}

/// Branches the caller may act on. `["all"]` for chapter-wide access.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/accessible-scope-response.ts"
)]
pub struct AccessibleScopeResponse {
    pub scope: Vec<String>,
    pub is_all: bool,
}

/// Active assignments of one subject with their count.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assignment-summary-response.ts"
)]
pub struct AssignmentSummaryResponse {
    pub assignments: Vec<AssignmentResponse>,
    pub total: usize,
}
