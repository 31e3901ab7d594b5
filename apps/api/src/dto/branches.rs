use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// Query string for branch listings.
#[derive(Debug, Default, Deserialize)]
pub struct BranchListQuery {
    pub chapter_id: Option<String>,
    pub status: Option<String>,
}

/// Query string for branch member listings.
#[derive(Debug, Default, Deserialize)]
pub struct MemberListQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// API representation of a branch.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/branch-response.ts"
)]
pub struct BranchResponse {
    pub branch_id: String,
    pub chapter_id: String,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub min_members: u32,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Reduced branch view for the unauthenticated registration form.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/public-branch-response.ts"
)]
pub struct PublicBranchResponse {
    pub branch_id: String,
    pub name: String,
    pub location: String,
}

/// Incoming payload for branch creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-branch-request.ts"
)]
pub struct CreateBranchRequest {
    pub chapter_id: String,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub min_members: Option<u32>,
}

/// Incoming payload for branch updates. Absent fields are left unchanged.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-branch-request.ts"
)]
pub struct UpdateBranchRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub min_members: Option<u32>,
    pub status: Option<String>,
}

/// Incoming payload for adding a member to a branch.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/add-member-request.ts"
)]
pub struct AddMemberRequest {
    pub user_id: String,
}

/// API representation of a branch membership.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/membership-response.ts"
)]
pub struct MembershipResponse {
    pub membership_id: String,
    pub user_id: String,
    pub branch_id: String,
    pub status: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<String>,
    pub card_issued: bool,
    pub card_issued_at: Option<String>,
    pub created_at: String,
}

/// A branch membership joined with the member's account details.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/branch-member-response.ts"
)]
pub struct BranchMemberResponse {
    pub membership: MembershipResponse,
    pub full_name: String,
    pub email: String,
    pub membership_number: String,
}

/// One page of a branch's members.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/member-list-response.ts"
)]
pub struct MemberListResponse {
    pub members: Vec<BranchMemberResponse>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

/// Incoming payload for membership updates. Absent fields are left unchanged.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-membership-request.ts"
)]
pub struct UpdateMembershipRequest {
    pub status: Option<String>,
    pub card_issued: Option<bool>,
}
