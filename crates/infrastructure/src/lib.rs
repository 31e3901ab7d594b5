//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod default_roles;
mod in_memory_store;
mod postgres_assignment_repository;
mod postgres_audit_repository;
mod postgres_branch_repository;
mod postgres_membership_repository;
mod postgres_role_repository;
mod postgres_rows;
mod postgres_session_token_repository;
mod postgres_user_repository;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use default_roles::{default_roles, seed_default_roles};
pub use in_memory_store::InMemoryStore;
pub use postgres_assignment_repository::PostgresAssignmentRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_branch_repository::PostgresBranchRepository;
pub use postgres_membership_repository::PostgresMembershipRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_session_token_repository::PostgresSessionTokenRepository;
pub use postgres_user_repository::PostgresUserRepository;
