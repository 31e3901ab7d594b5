use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use chapterdesk_application::{BranchFilter, CreateBranchInput, MemberFilter, MembershipPatch};
use chapterdesk_core::{AppError, UserId, UserIdentity};
use chapterdesk_domain::{BranchId, BranchPatch, MembershipId};

use crate::dto::{
    AddMemberRequest, BranchListQuery, BranchResponse, CreateBranchRequest, MemberListQuery,
    MemberListResponse, MembershipResponse, PublicBranchResponse, UpdateBranchRequest,
    UpdateMembershipRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod members;

pub use members::{
    add_member_handler, approve_member_handler, get_membership_handler,
    issue_membership_card_handler, list_branch_members_handler, update_membership_handler,
};

pub async fn list_public_branches_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PublicBranchResponse>>> {
    let branches = state
        .branch_service
        .list_public_branches()
        .await?
        .into_iter()
        .map(PublicBranchResponse::from)
        .collect();

    Ok(Json(branches))
}

pub async fn list_branches_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<BranchListQuery>,
) -> ApiResult<Json<Vec<BranchResponse>>> {
    let branches = state
        .branch_service
        .list_branches(&user, BranchFilter::try_from(query)?)
        .await?
        .into_iter()
        .map(BranchResponse::from)
        .collect();

    Ok(Json(branches))
}

pub async fn list_my_branches_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<BranchResponse>>> {
    let branches = state
        .branch_service
        .list_my_branches(&user)
        .await?
        .into_iter()
        .map(BranchResponse::from)
        .collect();

    Ok(Json(branches))
}

pub async fn get_branch_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(branch_id): Path<String>,
) -> ApiResult<Json<BranchResponse>> {
    let branch = state
        .branch_service
        .get_branch(&user, branch_id.parse::<BranchId>()?)
        .await?;

    Ok(Json(BranchResponse::from(branch)))
}

pub async fn create_branch_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateBranchRequest>,
) -> ApiResult<(StatusCode, Json<BranchResponse>)> {
    let branch = state
        .branch_service
        .create_branch(&user, CreateBranchInput::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(BranchResponse::from(branch))))
}

pub async fn update_branch_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(branch_id): Path<String>,
    Json(payload): Json<UpdateBranchRequest>,
) -> ApiResult<Json<BranchResponse>> {
    let branch = state
        .branch_service
        .update_branch(
            &user,
            branch_id.parse::<BranchId>()?,
            BranchPatch::try_from(payload)?,
        )
        .await?;

    Ok(Json(BranchResponse::from(branch)))
}

pub async fn deactivate_branch_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(branch_id): Path<String>,
) -> ApiResult<Json<BranchResponse>> {
    let branch = state
        .branch_service
        .deactivate_branch(&user, branch_id.parse::<BranchId>()?)
        .await?;

    Ok(Json(BranchResponse::from(branch)))
}

fn parse_member_path(branch_id: &str, user_id: &str) -> Result<(BranchId, UserId), AppError> {
    Ok((branch_id.parse::<BranchId>()?, user_id.parse::<UserId>()?))
}
