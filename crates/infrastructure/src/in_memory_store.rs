//! In-process adapter implementing every repository port.
//!
//! One `RwLock` guards the whole state, so each port operation runs as a
//! single critical section. The duplicate-active check of assignment inserts
//! and reactivations relies on this.

use std::collections::HashMap;

use tokio::sync::RwLock;

use chapterdesk_application::{AuditEvent, SessionTokenRecord, UserRecord};
use chapterdesk_core::UserId;
use chapterdesk_domain::{
    AssignmentId, BranchDefinition, BranchId, ExecutiveAssignment, Membership, MembershipId,
    RoleDefinition, RoleId,
};

mod accounts;
mod memberships;
mod rbac;


#[derive(Debug, Default)]
struct StoreState {
    roles: HashMap<RoleId, RoleDefinition>,
    assignments: HashMap<AssignmentId, ExecutiveAssignment>,
    branches: HashMap<BranchId, BranchDefinition>,
    memberships: HashMap<MembershipId, Membership>,
    users: HashMap<UserId, UserRecord>,
    membership_sequences: HashMap<i32, u64>,
    session_tokens: HashMap<String, SessionTokenRecord>,
    audit_events: Vec<AuditEvent>,
}

/// In-memory store for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the audit events appended so far, oldest first.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.read().await.audit_events.clone()
    }
}
