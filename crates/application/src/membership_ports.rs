mod inputs;
mod repositories;

pub use inputs::{BranchFilter, BranchMember, CreateBranchInput, MemberFilter, MembershipPatch};
pub use repositories::{BranchRepository, MembershipRepository};
