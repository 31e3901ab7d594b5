use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use chapterdesk_application::RegisterParams;
use chapterdesk_core::UserIdentity;
use chapterdesk_domain::BranchId;
use tracing::info;

use crate::dto::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UserResponse};
use crate::error::ApiResult;
use crate::middleware::BearerToken;
use crate::state::AppState;

pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let account = state
        .user_service
        .register(RegisterParams {
            email: payload.email,
            password: payload.password,
            full_name: payload.full_name,
            branch_id: payload.branch_id.parse::<BranchId>()?,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(account))))
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let issued = state
        .user_service
        .login(payload.email.as_str(), payload.password.as_str())
        .await?;
    let identity = state.user_service.authenticate(&issued.token).await?;
    let account = state.user_service.current_user(&identity).await?;

    info!(subject = %issued.subject, "user logged in");
    Ok(Json(LoginResponse::new(issued, account)))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
) -> ApiResult<Json<MessageResponse>> {
    state.user_service.logout(token.0.as_str()).await?;

    Ok(Json(MessageResponse::new("logged out")))
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<UserResponse>> {
    let account = state.user_service.current_user(&user).await?;

    Ok(Json(UserResponse::from(account)))
}
