//! In-process fakes shared by the service tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use chapterdesk_core::{AppError, AppResult, NonEmptyString, UserId, UserIdentity};
use chapterdesk_domain::{
    AssignmentId, AssignmentPatch, BranchDefinition, BranchId, BranchStatus, ChapterId,
    DEFAULT_MIN_MEMBERS, EmailAddress, ExecutiveAssignment, Membership, MembershipId,
    MembershipStatus,
    NewAssignment, PermissionMap, ResolvedAssignment, RoleDefinition, RoleId, RoleScopeKind,
    RoleTaxonomy, UserAccount, UserStatus,
};

use crate::{
    AssignmentRepository, AssignmentService, AuditEvent, AuditRepository, AuthorizationService,
    BranchFilter, BranchMember, BranchRepository, BranchService, MemberFilter,
    MembershipRepository, NewUserRecord, Page, PasswordHasher, RegisteredUser, RoleFilter,
    RoleRepository, RoleService, SessionTokenRecord, SessionTokenRepository, SessionTokenService,
    TaxonomyGrantPolicy, UserFilter, UserProfilePatch, UserRecord, UserRepository, UserService,
    UserStores,
};

#[derive(Default)]
struct FakeState {
    roles: Vec<RoleDefinition>,
    assignments: Vec<ExecutiveAssignment>,
    branches: Vec<BranchDefinition>,
    memberships: Vec<Membership>,
    users: Vec<UserRecord>,
    sequences: HashMap<i32, u64>,
    tokens: HashMap<String, SessionTokenRecord>,
    events: Vec<AuditEvent>,
}

/// One fake backing every repository port.
#[derive(Default)]
pub(crate) struct FakeStore {
    state: Mutex<FakeState>,
    fail_membership_writes: AtomicBool,
}

impl FakeStore {
    /// Makes registrations that carry a membership fail before anything is stored.
    pub(crate) fn fail_membership_writes(&self) {
        self.fail_membership_writes.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn seed_role(&self, role: RoleDefinition) -> RoleDefinition {
        self.state.lock().await.roles.push(role.clone());
        role
    }

    pub(crate) async fn seed_assignment(
        &self,
        subject: UserId,
        role: &RoleDefinition,
        branch_id: Option<BranchId>,
    ) -> ExecutiveAssignment {
        let assignment = NewAssignment {
            subject,
            role_id: role.role_id,
            chapter_id: None,
            branch_id,
            start_date: Utc::now(),
            end_date: None,
            granted_by: subject,
            notes: None,
        }
        .into_assignment(AssignmentId::new(), Utc::now());
        self.state.lock().await.assignments.push(assignment.clone());
        assignment
    }

    pub(crate) async fn seed_branch(&self, name: &str) -> BranchDefinition {
        let branch = BranchDefinition {
            branch_id: BranchId::new(),
            chapter_id: ChapterId::new(),
            name: text(name),
            location: text(name),
            description: None,
            min_members: DEFAULT_MIN_MEMBERS,
            status: BranchStatus::Active,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.state.lock().await.branches.push(branch.clone());
        branch
    }

    pub(crate) async fn seed_membership(&self, membership: Membership) {
        self.state.lock().await.memberships.push(membership);
    }

    pub(crate) async fn events(&self) -> Vec<AuditEvent> {
        self.state.lock().await.events.clone()
    }

    pub(crate) async fn memberships(&self) -> Vec<Membership> {
        self.state.lock().await.memberships.clone()
    }

    pub(crate) async fn users(&self) -> Vec<UserRecord> {
        self.state.lock().await.users.clone()
    }
}

#[async_trait]
impl RoleRepository for FakeStore {
    async fn list_roles(&self, filter: &RoleFilter) -> AppResult<Vec<RoleDefinition>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .filter(|role| filter.include_inactive || role.is_active)
            .filter(|role| filter.scope_kind.is_none_or(|kind| role.scope_kind == kind))
            .filter(|role| {
                filter
                    .category
                    .as_ref()
                    .is_none_or(|category| role.category.as_ref() == Some(category))
            })
            .cloned()
            .collect())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .find(|role| role.role_id == role_id)
            .cloned())
    }

    async fn create_role(&self, role: RoleDefinition) -> AppResult<RoleDefinition> {
        let mut state = self.state.lock().await;
        if state.roles.iter().any(|stored| stored.name == role.name) {
            return Err(AppError::Conflict(format!("role '{}' exists", role.name)));
        }
        state.roles.push(role.clone());
        Ok(role)
    }

    async fn save_role(&self, role: RoleDefinition) -> AppResult<RoleDefinition> {
        let mut state = self.state.lock().await;
        let stored = state
            .roles
            .iter_mut()
            .find(|stored| stored.role_id == role.role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{}' not found", role.role_id)))?;
        *stored = role.clone();
        Ok(role)
    }
}

#[async_trait]
impl AssignmentRepository for FakeStore {
    async fn insert_active_assignment(
        &self,
        assignment: NewAssignment,
    ) -> AppResult<Option<ExecutiveAssignment>> {
        let mut state = self.state.lock().await;
        let duplicate = state.assignments.iter().any(|stored| {
            stored.is_active
                && stored.subject == assignment.subject
                && stored.role_id == assignment.role_id
        });
        if duplicate {
            return Ok(None);
        }

        let stored = assignment.into_assignment(AssignmentId::new(), Utc::now());
        state.assignments.push(stored.clone());
        Ok(Some(stored))
    }

    async fn find_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> AppResult<Option<ExecutiveAssignment>> {
        Ok(self
            .state
            .lock()
            .await
            .assignments
            .iter()
            .find(|assignment| assignment.assignment_id == assignment_id)
            .cloned())
    }

    async fn update_assignment(
        &self,
        assignment_id: AssignmentId,
        patch: &AssignmentPatch,
    ) -> AppResult<Option<ExecutiveAssignment>> {
        let mut state = self.state.lock().await;
        let Some(position) = state
            .assignments
            .iter()
            .position(|assignment| assignment.assignment_id == assignment_id)
        else {
            return Ok(None);
        };

        let current = state.assignments[position].clone();
        if patch.reactivates(&current) {
            let duplicate = state.assignments.iter().any(|stored| {
                stored.is_active
                    && stored.assignment_id != assignment_id
                    && stored.subject == current.subject
                    && stored.role_id == current.role_id
            });
            if duplicate {
                return Err(AppError::Conflict("duplicate active assignment".to_owned()));
            }
        }

        let assignment = &mut state.assignments[position];
        patch.apply_to(assignment, Utc::now());
        Ok(Some(assignment.clone()))
    }

    async fn list_assignments_for_subject(
        &self,
        subject: UserId,
        active_only: bool,
    ) -> AppResult<Vec<ResolvedAssignment>> {
        let state = self.state.lock().await;
        Ok(state
            .assignments
            .iter()
            .filter(|assignment| assignment.subject == subject)
            .filter(|assignment| !active_only || assignment.is_active)
            .filter_map(|assignment| {
                state
                    .roles
                    .iter()
                    .find(|role| role.role_id == assignment.role_id)
                    .map(|role| ResolvedAssignment {
                        assignment: assignment.clone(),
                        role: role.clone(),
                    })
            })
            .collect())
    }
}

#[async_trait]
impl BranchRepository for FakeStore {
    async fn list_branches(&self, filter: &BranchFilter) -> AppResult<Vec<BranchDefinition>> {
        Ok(self
            .state
            .lock()
            .await
            .branches
            .iter()
            .filter(|branch| filter.status.is_none_or(|status| branch.status == status))
            .filter(|branch| filter.chapter_id.is_none_or(|id| branch.chapter_id == id))
            .filter(|branch| {
                filter
                    .branch_ids
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&branch.branch_id))
            })
            .cloned()
            .collect())
    }

    async fn find_branch(&self, branch_id: BranchId) -> AppResult<Option<BranchDefinition>> {
        Ok(self
            .state
            .lock()
            .await
            .branches
            .iter()
            .find(|branch| branch.branch_id == branch_id)
            .cloned())
    }

    async fn create_branch(&self, branch: BranchDefinition) -> AppResult<BranchDefinition> {
        let mut state = self.state.lock().await;
        if state
            .branches
            .iter()
            .any(|stored| stored.chapter_id == branch.chapter_id && stored.name == branch.name)
        {
            return Err(AppError::Conflict(format!("branch '{}' exists", branch.name)));
        }
        state.branches.push(branch.clone());
        Ok(branch)
    }

    async fn save_branch(&self, branch: BranchDefinition) -> AppResult<BranchDefinition> {
        let mut state = self.state.lock().await;
        let stored = state
            .branches
            .iter_mut()
            .find(|stored| stored.branch_id == branch.branch_id)
            .ok_or_else(|| AppError::NotFound("branch not found".to_owned()))?;
        *stored = branch.clone();
        Ok(branch)
    }
}

#[async_trait]
impl MembershipRepository for FakeStore {
    async fn list_branch_members(
        &self,
        branch_id: BranchId,
        filter: &MemberFilter,
    ) -> AppResult<Page<BranchMember>> {
        let state = self.state.lock().await;
        let mut members: Vec<BranchMember> = state
            .memberships
            .iter()
            .filter(|membership| membership.branch_id == branch_id)
            .filter(|membership| filter.status.is_none_or(|status| membership.status == status))
            .filter_map(|membership| {
                state
                    .users
                    .iter()
                    .find(|user| user.account.user_id == membership.user_id)
                    .map(|user| BranchMember {
                        membership: membership.clone(),
                        full_name: user.account.full_name.to_string(),
                        email: user.account.email.as_str().to_owned(),
                        membership_number: user.account.membership_number.clone(),
                    })
            })
            .collect();
        members.sort_by(|left, right| left.full_name.cmp(&right.full_name));
        Ok(filter.page.slice(members))
    }

    async fn find_membership_by_id(
        &self,
        membership_id: MembershipId,
    ) -> AppResult<Option<Membership>> {
        Ok(self
            .state
            .lock()
            .await
            .memberships
            .iter()
            .find(|membership| membership.membership_id == membership_id)
            .cloned())
    }

    async fn list_user_memberships(&self, user_id: UserId) -> AppResult<Vec<Membership>> {
        Ok(self
            .state
            .lock()
            .await
            .memberships
            .iter()
            .filter(|membership| membership.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_membership(
        &self,
        user_id: UserId,
        branch_id: BranchId,
    ) -> AppResult<Option<Membership>> {
        Ok(self
            .state
            .lock()
            .await
            .memberships
            .iter()
            .find(|membership| membership.user_id == user_id && membership.branch_id == branch_id)
            .cloned())
    }

    async fn create_membership(&self, membership: Membership) -> AppResult<Membership> {
        let mut state = self.state.lock().await;
        if state.memberships.iter().any(|stored| {
            stored.user_id == membership.user_id && stored.branch_id == membership.branch_id
        }) {
            return Err(AppError::Conflict("membership exists".to_owned()));
        }
        state.memberships.push(membership.clone());
        Ok(membership)
    }

    async fn save_membership(&self, membership: Membership) -> AppResult<Membership> {
        let mut state = self.state.lock().await;
        let stored = state
            .memberships
            .iter_mut()
            .find(|stored| stored.membership_id == membership.membership_id)
            .ok_or_else(|| AppError::NotFound("membership not found".to_owned()))?;
        *stored = membership.clone();
        Ok(membership)
    }

    async fn count_active_members(&self, branch_id: BranchId) -> AppResult<u64> {
        Ok(self
            .state
            .lock()
            .await
            .memberships
            .iter()
            .filter(|membership| {
                membership.branch_id == branch_id && membership.status == MembershipStatus::Active
            })
            .count() as u64)
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .iter()
            .find(|user| &user.account.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .iter()
            .find(|user| user.account.user_id == user_id)
            .cloned())
    }

    async fn next_membership_sequence(&self, year: i32) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let sequence = state.sequences.entry(year).or_insert(0);
        *sequence += 1;
        Ok(*sequence)
    }

    async fn create_user(&self, user: NewUserRecord) -> AppResult<RegisteredUser> {
        let mut state = self.state.lock().await;
        if state
            .users
            .iter()
            .any(|stored| stored.account.email == user.email)
        {
            return Err(AppError::Conflict("email taken".to_owned()));
        }
        if self.fail_membership_writes.load(Ordering::SeqCst) && user.initial_branch.is_some() {
            return Err(AppError::Internal("membership write failed".to_owned()));
        }

        let now = Utc::now();
        let account = UserAccount {
            user_id: UserId::new(),
            email: user.email,
            full_name: user.full_name,
            status: user.status,
            membership_number: user.membership_number,
            created_at: now,
            updated_at: now,
        };
        let membership = user
            .initial_branch
            .map(|branch_id| Membership::pending(account.user_id, branch_id, now));
        if let Some(membership) = &membership {
            state.memberships.push(membership.clone());
        }
        state.users.push(UserRecord {
            account: account.clone(),
            password_hash: user.password_hash,
        });
        Ok(RegisteredUser {
            account,
            membership,
        })
    }

    async fn list_users(&self, filter: &UserFilter) -> AppResult<Page<UserAccount>> {
        let state = self.state.lock().await;
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut users: Vec<UserAccount> = state
            .users
            .iter()
            .map(|user| &user.account)
            .filter(|account| filter.status.is_none_or(|status| account.status == status))
            .filter(|account| {
                filter.branch_ids.as_ref().is_none_or(|branch_ids| {
                    state.memberships.iter().any(|membership| {
                        membership.user_id == account.user_id
                            && branch_ids.contains(&membership.branch_id)
                    })
                })
            })
            .filter(|account| {
                search.as_deref().is_none_or(|search| {
                    account.full_name.as_str().to_lowercase().contains(search)
                        || account.membership_number.to_lowercase().contains(search)
                })
            })
            .cloned()
            .collect();
        users.sort_by(|left, right| left.full_name.cmp(&right.full_name));
        Ok(filter.page.slice(users))
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        patch: &UserProfilePatch,
    ) -> AppResult<Option<UserAccount>> {
        let mut state = self.state.lock().await;
        Ok(state
            .users
            .iter_mut()
            .find(|user| user.account.user_id == user_id)
            .map(|user| {
                if let Some(full_name) = &patch.full_name {
                    user.account.full_name = full_name.clone();
                }
                user.account.clone()
            }))
    }

    async fn update_status(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> AppResult<Option<UserAccount>> {
        let mut state = self.state.lock().await;
        Ok(state
            .users
            .iter_mut()
            .find(|user| user.account.user_id == user_id)
            .map(|user| {
                user.account.status = status;
                user.account.clone()
            }))
    }
}

#[async_trait]
impl SessionTokenRepository for FakeStore {
    async fn store_token(&self, record: SessionTokenRecord) -> AppResult<()> {
        self.state
            .lock()
            .await
            .tokens
            .insert(record.token_hash.clone(), record);
        Ok(())
    }

    async fn find_token(&self, token_hash: &str) -> AppResult<Option<SessionTokenRecord>> {
        Ok(self.state.lock().await.tokens.get(token_hash).cloned())
    }

    async fn delete_token(&self, token_hash: &str) -> AppResult<()> {
        self.state.lock().await.tokens.remove(token_hash);
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for FakeStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.lock().await.events.push(event);
        Ok(())
    }
}

/// Reversible "hash" keeping tests fast.
pub(crate) struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

/// Every service wired against one fake store.
pub(crate) struct Services {
    pub(crate) store: Arc<FakeStore>,
    pub(crate) authorization: AuthorizationService,
    pub(crate) assignments: AssignmentService,
    pub(crate) roles: RoleService,
    pub(crate) branches: BranchService,
    pub(crate) users: UserService,
}

pub(crate) fn services() -> Services {
    let store = Arc::new(FakeStore::default());
    let taxonomy = Arc::new(RoleTaxonomy::default());
    let authorization = AuthorizationService::new(store.clone(), taxonomy.clone());

    Services {
        assignments: AssignmentService::new(
            authorization.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(TaxonomyGrantPolicy::new(taxonomy)),
        ),
        roles: RoleService::new(authorization.clone(), store.clone(), store.clone()),
        branches: BranchService::new(
            authorization.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        ),
        users: UserService::new(
            UserStores {
                users: store.clone(),
                branches: store.clone(),
                memberships: store.clone(),
                audit: store.clone(),
            },
            Arc::new(FakePasswordHasher),
            Arc::new(SessionTokenService::new(store.clone(), 60)),
            authorization.clone(),
        ),
        authorization,
        store,
    }
}

pub(crate) fn text(value: &str) -> NonEmptyString {
    NonEmptyString::new(value).unwrap_or_else(|_| panic!("valid text"))
}

pub(crate) fn role(name: &str, scope_kind: RoleScopeKind, permissions: PermissionMap) -> RoleDefinition {
    RoleDefinition {
        role_id: RoleId::new(),
        name: text(name),
        scope_kind,
        category: None,
        description: None,
        permissions,
        is_active: true,
    }
}

pub(crate) fn approved(user_id: UserId) -> UserIdentity {
    UserIdentity::new(user_id, "Test Member", None, true)
}

/// Seeds a role and an active assignment of it, returning the holder's identity.
pub(crate) async fn holder_of(
    store: &FakeStore,
    role_name: &str,
    branch_id: Option<BranchId>,
) -> (UserIdentity, RoleDefinition) {
    let scope_kind = if branch_id.is_some() {
        RoleScopeKind::Branch
    } else {
        RoleScopeKind::Chapter
    };
    let role = store
        .seed_role(role(role_name, scope_kind, PermissionMap::new()))
        .await;
    let user_id = UserId::new();
    store.seed_assignment(user_id, &role, branch_id).await;
    (approved(user_id), role)
}
