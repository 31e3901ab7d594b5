mod auth;
mod branches;
mod common;
mod rbac;

pub use auth::{
    LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest, UpdateUserStatusRequest,
    UserListQuery, UserListResponse, UserResponse,
};
pub use branches::{
    AddMemberRequest, BranchListQuery, BranchMemberResponse, BranchResponse, CreateBranchRequest,
    MemberListQuery, MemberListResponse, MembershipResponse, PublicBranchResponse,
    UpdateBranchRequest, UpdateMembershipRequest,
};
pub use common::{HealthResponse, MessageResponse};
pub use rbac::{
    AccessibleScopeResponse, AssignmentListQuery, AssignmentResponse, AssignmentSummaryResponse,
    BulkGrantRequest, BulkGrantResponse, CreateRoleRequest, EffectivePermissionsResponse,
    GrantAssignmentRequest, RoleCategoryResponse, RoleListQuery, RoleResponse,
    UpdateAssignmentRequest, UpdateRoleRequest,
};

#[cfg(test)]
mod tests {
    use super::{
        AccessibleScopeResponse, AddMemberRequest, AssignmentResponse, AssignmentSummaryResponse,
        BranchMemberResponse, BranchResponse, BulkGrantRequest, BulkGrantResponse,
        CreateBranchRequest, CreateRoleRequest, EffectivePermissionsResponse,
        GrantAssignmentRequest, HealthResponse, LoginRequest, LoginResponse, MemberListResponse,
        MembershipResponse, MessageResponse, PublicBranchResponse, RegisterRequest,
        RoleCategoryResponse, RoleResponse, UpdateAssignmentRequest, UpdateBranchRequest,
        UpdateMembershipRequest, UpdateProfileRequest, UpdateRoleRequest,
        UpdateUserStatusRequest, UserListResponse, UserResponse,
    };
    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();
        HealthResponse::export(&config)?;
        MessageResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        RegisterRequest::export(&config)?;
        LoginRequest::export(&config)?;
        LoginResponse::export(&config)?;
        UserResponse::export(&config)?;
        UpdateUserStatusRequest::export(&config)?;
        UserListResponse::export(&config)?;
        UpdateProfileRequest::export(&config)?;
        RoleResponse::export(&config)?;
        RoleCategoryResponse::export(&config)?;
        CreateRoleRequest::export(&config)?;
        UpdateRoleRequest::export(&config)?;
        GrantAssignmentRequest::export(&config)?;
        BulkGrantRequest::export(&config)?;
        UpdateAssignmentRequest::export(&config)?;
        AssignmentResponse::export(&config)?;
        AssignmentSummaryResponse::export(&config)?;
        super::rbac::BulkGrantItemResponse::export(&config)?;
        BulkGrantResponse::export(&config)?;
        EffectivePermissionsResponse::export(&config)?;
        AccessibleScopeResponse::export(&config)?;
        BranchResponse::export(&config)?;
        PublicBranchResponse::export(&config)?;
        CreateBranchRequest::export(&config)?;
        UpdateBranchRequest::export(&config)?;
        AddMemberRequest::export(&config)?;
        MembershipResponse::export(&config)?;
        BranchMemberResponse::export(&config)?;
        MemberListResponse::export(&config)?;
        UpdateMembershipRequest::export(&config)?;
        Ok(())
    }
}
