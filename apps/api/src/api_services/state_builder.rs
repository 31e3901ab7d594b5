use std::sync::Arc;

use chapterdesk_application::{
    AssignmentService, AuthorizationService, BranchService, RoleService, SessionTokenService,
    TaxonomyGrantPolicy, UserService, UserStores,
};
use chapterdesk_core::AppError;
use chapterdesk_infrastructure::{Argon2PasswordHasher, seed_default_roles};
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod repositories;

pub use repositories::RepositorySet;

/// Wires services over the given repositories and seeds the default role catalog.
pub async fn build_app_state(
    repositories: RepositorySet,
    config: &ApiConfig,
) -> Result<AppState, AppError> {
    let taxonomy = Arc::new(config.role_taxonomy()?);

    let seeded = seed_default_roles(repositories.role_repository.as_ref()).await?;
    if seeded > 0 {
        info!(seeded, "default roles created");
    }

    let authorization_service =
        AuthorizationService::new(repositories.assignment_repository.clone(), taxonomy.clone());
    let token_service = Arc::new(SessionTokenService::new(
        repositories.session_token_repository.clone(),
        config.token_ttl_minutes,
    ));

    Ok(AppState {
        assignment_service: AssignmentService::new(
            authorization_service.clone(),
            repositories.role_repository.clone(),
            repositories.assignment_repository.clone(),
            repositories.audit_repository.clone(),
            Arc::new(TaxonomyGrantPolicy::new(taxonomy)),
        ),
        role_service: RoleService::new(
            authorization_service.clone(),
            repositories.role_repository.clone(),
            repositories.audit_repository.clone(),
        ),
        branch_service: BranchService::new(
            authorization_service.clone(),
            repositories.branch_repository.clone(),
            repositories.membership_repository.clone(),
            repositories.audit_repository.clone(),
        ),
        user_service: UserService::new(
            UserStores {
                users: repositories.user_repository,
                branches: repositories.branch_repository,
                memberships: repositories.membership_repository,
                audit: repositories.audit_repository,
            },
            Arc::new(Argon2PasswordHasher::new()),
            token_service,
            authorization_service.clone(),
        ),
        authorization_service,
    })
}
