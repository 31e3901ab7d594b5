use axum::Json;
use axum::extract::{Extension, State};
use chapterdesk_core::UserIdentity;

use crate::dto::{AccessibleScopeResponse, AssignmentResponse, EffectivePermissionsResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn my_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<EffectivePermissionsResponse>> {
    let access = state.authorization_service.resolve_actor(&user).await?;

    Ok(Json(EffectivePermissionsResponse::from(&access.permissions)))
}

pub async fn my_scope_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<AccessibleScopeResponse>> {
    let access = state.authorization_service.resolve_actor(&user).await?;

    Ok(Json(AccessibleScopeResponse::from(&access.scope)))
}

pub async fn my_assignments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let assignments = state
        .assignment_service
        .list_my_assignments(&user)
        .await?
        .into_iter()
        .map(AssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}
