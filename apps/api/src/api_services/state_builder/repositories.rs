use std::sync::Arc;

use chapterdesk_application::{
    AssignmentRepository, AuditRepository, BranchRepository, MembershipRepository,
    RoleRepository, SessionTokenRepository, UserRepository,
};
use chapterdesk_infrastructure::{
    InMemoryStore, PostgresAssignmentRepository, PostgresAuditRepository,
    PostgresBranchRepository, PostgresMembershipRepository, PostgresRoleRepository,
    PostgresSessionTokenRepository, PostgresUserRepository,
};
use sqlx::PgPool;

/// Port handles backing one running API.
#[derive(Clone)]
pub struct RepositorySet {
    pub(super) role_repository: Arc<dyn RoleRepository>,
    pub(super) assignment_repository: Arc<dyn AssignmentRepository>,
    pub(super) branch_repository: Arc<dyn BranchRepository>,
    pub(super) membership_repository: Arc<dyn MembershipRepository>,
    pub(super) user_repository: Arc<dyn UserRepository>,
    pub(super) session_token_repository: Arc<dyn SessionTokenRepository>,
    pub(super) audit_repository: Arc<dyn AuditRepository>,
}

impl RepositorySet {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            role_repository: Arc::new(PostgresRoleRepository::new(pool.clone())),
            assignment_repository: Arc::new(PostgresAssignmentRepository::new(pool.clone())),
            branch_repository: Arc::new(PostgresBranchRepository::new(pool.clone())),
            membership_repository: Arc::new(PostgresMembershipRepository::new(pool.clone())),
            user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
            session_token_repository: Arc::new(PostgresSessionTokenRepository::new(pool.clone())),
            audit_repository: Arc::new(PostgresAuditRepository::new(pool.clone())),
        }
    }

    /// Every port served by one shared in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            role_repository: store.clone(),
            assignment_repository: store.clone(),
            branch_repository: store.clone(),
            membership_repository: store.clone(),
            user_repository: store.clone(),
            session_token_repository: store.clone(),
            audit_repository: store,
        }
    }
}
