use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use chapterdesk_application::{CreateRoleInput, RoleFilter, UpdateRoleInput};
use chapterdesk_core::UserIdentity;
use chapterdesk_domain::RoleId;

use crate::dto::{
    CreateRoleRequest, RoleCategoryResponse, RoleListQuery, RoleResponse, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<RoleListQuery>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .role_service
        .list_roles(&user, RoleFilter::try_from(query)?)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn list_role_categories_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleCategoryResponse>>> {
    let categories = state
        .role_service
        .list_role_categories(&user)
        .await?
        .into_iter()
        .map(RoleCategoryResponse::from)
        .collect();

    Ok(Json(categories))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_service
        .get_role(&user, role_id.parse::<RoleId>()?)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .role_service
        .create_role(&user, CreateRoleInput::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_service
        .update_role(
            &user,
            role_id.parse::<RoleId>()?,
            UpdateRoleInput::from(payload),
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}
