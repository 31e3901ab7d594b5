use chapterdesk_application::{
    IssuedToken, Page, PageRequest, UserListParams, UserProfilePatch,
};
use chapterdesk_core::{AppError, NonEmptyString};
use chapterdesk_domain::{BranchId, UserAccount, UserStatus};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::format_timestamp;

/// Incoming payload for self-registration.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/register-request.ts"
)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub branch_id: String,
}

/// Incoming payload for password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Bearer token issued by a successful login.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-response.ts"
)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: String,
    pub user: UserResponse,
}

impl LoginResponse {
    pub fn new(token: IssuedToken, user: UserAccount) -> Self {
        Self {
            access_token: token.token,
            token_type: "bearer",
            expires_at: format_timestamp(token.expires_at),
            user: user.into(),
        }
    }
}

/// API representation of a user account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub status: String,
    pub membership_number: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserAccount> for UserResponse {
    fn from(value: UserAccount) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            email: value.email.as_str().to_owned(),
            full_name: value.full_name.as_str().to_owned(),
            status: value.status.as_str().to_owned(),
            membership_number: value.membership_number,
            created_at: format_timestamp(value.created_at),
            updated_at: format_timestamp(value.updated_at),
        }
    }
}

/// Incoming payload for an account status change.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-status-request.ts"
)]
pub struct UpdateUserStatusRequest {
    pub status: String,
}

/// Query string for user listings.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub status: Option<String>,
    pub branch_id: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl TryFrom<UserListQuery> for UserListParams {
    type Error = AppError;

    fn try_from(value: UserListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            status: value
                .status
                .as_deref()
                .map(str::parse::<UserStatus>)
                .transpose()?,
            branch_id: value
                .branch_id
                .as_deref()
                .map(str::parse::<BranchId>)
                .transpose()?,
            search: value.search,
            page: PageRequest::new(value.page, value.size)?,
        })
    }
}

/// One page of user accounts.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-list-response.ts"
)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

impl UserListResponse {
    pub fn new(page: Page<UserAccount>, request: PageRequest) -> Self {
        Self {
            users: page.items.into_iter().map(UserResponse::from).collect(),
            total: page.total,
            page: request.page(),
            size: request.size(),
        }
    }
}

/// Incoming payload for changes to the caller's own profile.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-profile-request.ts"
)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
}

impl TryFrom<UpdateProfileRequest> for UserProfilePatch {
    type Error = AppError;

    fn try_from(value: UpdateProfileRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            full_name: value.full_name.map(NonEmptyString::new).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chapterdesk_application::{DEFAULT_PAGE_SIZE, UserListParams, UserProfilePatch};
    use chapterdesk_core::AppError;
    use chapterdesk_domain::UserStatus;

    use super::{UpdateProfileRequest, UserListQuery};

    #[test]
    fn user_list_query_parses_filters_and_page() {
        let params = UserListParams::try_from(UserListQuery {
            status: Some("pending_approval".to_owned()),
            page: Some(3),
            ..UserListQuery::default()
        });

        assert!(matches!(
            params,
            Ok(params) if params.status == Some(UserStatus::PendingApproval)
                && params.page.page() == 3
                && params.page.size() == DEFAULT_PAGE_SIZE
        ));
    }

    #[test]
    fn oversized_page_and_blank_name_are_rejected() {
        let oversized = UserListParams::try_from(UserListQuery {
            size: Some(1000),
            ..UserListQuery::default()
        });
        assert!(matches!(oversized, Err(AppError::Validation(_))));

        let blank = UserProfilePatch::try_from(UpdateProfileRequest {
            full_name: Some("  ".to_owned()),
        });
        assert!(matches!(blank, Err(AppError::Validation(_))));
    }
}
