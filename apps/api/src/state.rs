use chapterdesk_application::{
    AssignmentService, AuthorizationService, BranchService, RoleService, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub assignment_service: AssignmentService,
    pub role_service: RoleService,
    pub branch_service: BranchService,
    pub user_service: UserService,
}
