use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use chapterdesk_application::{UserListParams, UserProfilePatch};
use chapterdesk_core::{UserId, UserIdentity};
use chapterdesk_domain::UserStatus;

use crate::dto::{
    AssignmentListQuery, AssignmentResponse, AssignmentSummaryResponse,
    EffectivePermissionsResponse, UpdateProfileRequest, UpdateUserStatusRequest, UserListQuery,
    UserListResponse, UserResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<UserListResponse>> {
    let params = UserListParams::try_from(query)?;
    let request = params.page;
    let page = state.user_service.list_users(&user, params).await?;

    Ok(Json(UserListResponse::new(page, request)))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let account = state
        .user_service
        .get_user(&user, user_id.parse::<UserId>()?)
        .await?;

    Ok(Json(UserResponse::from(account)))
}

pub async fn update_my_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    let account = state
        .user_service
        .update_my_profile(&user, UserProfilePatch::try_from(payload)?)
        .await?;

    Ok(Json(UserResponse::from(account)))
}

pub async fn user_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<EffectivePermissionsResponse>> {
    let access = state
        .assignment_service
        .subject_access(&user, user_id.parse::<UserId>()?)
        .await?;

    Ok(Json(EffectivePermissionsResponse::from(&access.permissions)))
}

pub async fn user_assignments_summary_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<AssignmentSummaryResponse>> {
    let assignments = state
        .assignment_service
        .list_subject_assignments(&user, user_id.parse::<UserId>()?, true)
        .await?;

    Ok(Json(AssignmentSummaryResponse::from(assignments)))
}

pub async fn list_user_assignments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Query(query): Query<AssignmentListQuery>,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let assignments = state
        .assignment_service
        .list_subject_assignments(&user, user_id.parse::<UserId>()?, query.active_only)
        .await?
        .into_iter()
        .map(AssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn update_user_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserStatusRequest>,
) -> ApiResult<Json<UserResponse>> {
    let account = state
        .user_service
        .update_user_status(
            &user,
            user_id.parse::<UserId>()?,
            payload.status.parse::<UserStatus>()?,
        )
        .await?;

    Ok(Json(UserResponse::from(account)))
}
