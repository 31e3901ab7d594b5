mod inputs;
mod repositories;

pub use inputs::{CreateRoleInput, GrantAssignmentInput, RoleFilter, UpdateRoleInput};
pub use repositories::{AssignmentRepository, RoleRepository};
