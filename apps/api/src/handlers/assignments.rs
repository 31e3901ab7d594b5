use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use chapterdesk_application::GrantAssignmentInput;
use chapterdesk_core::{AppError, UserIdentity};
use chapterdesk_domain::{AssignmentId, AssignmentPatch};

use crate::dto::{
    AssignmentResponse, BulkGrantRequest, BulkGrantResponse, GrantAssignmentRequest,
    UpdateAssignmentRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn grant_assignment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<GrantAssignmentRequest>,
) -> ApiResult<(StatusCode, Json<AssignmentResponse>)> {
    let assignment = state
        .assignment_service
        .grant(&user, GrantAssignmentInput::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(AssignmentResponse::from(assignment))))
}

/// Grants every item in order. Items that fail to parse are rejected before
/// anything is written.
pub async fn bulk_grant_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<BulkGrantRequest>,
) -> ApiResult<Json<BulkGrantResponse>> {
    let items = payload
        .assignments
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            GrantAssignmentInput::try_from(item).map_err(|error| match error {
                AppError::Validation(message) => {
                    AppError::Validation(format!("assignments[{index}]: {message}"))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let outcomes = state.assignment_service.bulk_grant(&user, items).await?;

    Ok(Json(BulkGrantResponse::from(outcomes)))
}

pub async fn get_assignment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(assignment_id): Path<String>,
) -> ApiResult<Json<AssignmentResponse>> {
    let assignment = state
        .assignment_service
        .get_assignment(&user, assignment_id.parse::<AssignmentId>()?)
        .await?;

    Ok(Json(AssignmentResponse::from(assignment)))
}

pub async fn update_assignment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(assignment_id): Path<String>,
    Json(payload): Json<UpdateAssignmentRequest>,
) -> ApiResult<Json<AssignmentResponse>> {
    let assignment = state
        .assignment_service
        .update(
            &user,
            assignment_id.parse::<AssignmentId>()?,
            AssignmentPatch::try_from(payload)?,
        )
        .await?;

    Ok(Json(AssignmentResponse::from(assignment)))
}

/// Soft revocation, served by both `DELETE` and `POST .../deactivate`.
pub async fn revoke_assignment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(assignment_id): Path<String>,
) -> ApiResult<Json<AssignmentResponse>> {
    let assignment = state
        .assignment_service
        .revoke(&user, assignment_id.parse::<AssignmentId>()?)
        .await?;

    Ok(Json(AssignmentResponse::from(assignment)))
}
