use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chapterdesk_application::{
    AssignmentRepository, BranchRepository, RegisterParams, RoleFilter, RoleRepository,
    UserRepository,
};
use chapterdesk_core::{NonEmptyString, UserId, UserIdentity};
use chapterdesk_domain::{
    BranchDefinition, BranchId, BranchStatus, ChapterId, DEFAULT_MIN_MEMBERS, NewAssignment,
    UserStatus,
};
use chapterdesk_infrastructure::InMemoryStore;
use chrono::Utc;
use serde_json::json;

use crate::api_config::{ApiConfig, StoreBackend};
use crate::api_services::{RepositorySet, build_app_state};
use crate::dto::{
    AssignmentListQuery, BulkGrantRequest, CreateRoleRequest, GrantAssignmentRequest,
    LoginRequest, MemberListQuery, RegisterRequest, RoleListQuery, UpdateMembershipRequest,
    UpdateProfileRequest, UpdateUserStatusRequest, UserListQuery,
};
use crate::middleware::BearerToken;
use crate::state::AppState;

use super::{assignments, auth, branches, health, me, roles, users};

const PASSWORD: &str = "Branch2026Rally";

struct Harness {
    state: AppState,
    store: Arc<InMemoryStore>,
    branch: BranchDefinition,
}

fn memory_config() -> ApiConfig {
    ApiConfig {
        migrate_only: false,
        store_backend: StoreBackend::Memory,
        frontend_url: "http://localhost:3000".to_owned(),
        api_host: "127.0.0.1".to_owned(),
        api_port: 3001,
        role_taxonomy_path: None,
        token_ttl_minutes: 60,
    }
}

async fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let state = build_app_state(RepositorySet::in_memory(store.clone()), &memory_config())
        .await
        .unwrap_or_else(|error| panic!("state build failed: {error}"));
    let branch = seed_branch(&store, "Leeds").await;

    Harness {
        state,
        store,
        branch,
    }
}

async fn seed_branch(store: &InMemoryStore, name: &str) -> BranchDefinition {
    let text = |value: &str| {
        NonEmptyString::new(value).unwrap_or_else(|error| panic!("invalid text: {error}"))
    };
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

    BranchRepository::create_branch(store, branch)
        .await
        .unwrap_or_else(|error| panic!("branch seed failed: {error}"))
}

async fn member_in(
    harness: &Harness,
    email: &str,
    branch_id: BranchId,
    approved: bool,
) -> (UserIdentity, String) {
    let account = harness
        .state
        .user_service
        .register(RegisterParams {
            email: email.to_owned(),
            password: PASSWORD.to_owned(),
            full_name: "Ada Obi".to_owned(),
            branch_id,
        })
        .await
        .unwrap_or_else(|error| panic!("registration failed: {error}"));

    if approved {
        let updated =
            UserRepository::update_status(harness.store.as_ref(), account.user_id, UserStatus::Approved)
                .await;
        assert!(matches!(updated, Ok(Some(_))));
    }

    let issued = harness
        .state
        .user_service
        .login(email, PASSWORD)
        .await
        .unwrap_or_else(|error| panic!("login failed: {error}"));
    let identity = harness
        .state
        .user_service
        .authenticate(&issued.token)
        .await
        .unwrap_or_else(|error| panic!("authenticate failed: {error}"));

    (identity, issued.token)
}

async fn holder(
    harness: &Harness,
    email: &str,
    role_name: &str,
    branch_id: Option<BranchId>,
) -> UserIdentity {
    let (identity, _) = member_in(harness, email, harness.branch.branch_id, true).await;
    let role = RoleRepository::list_roles(harness.store.as_ref(), &RoleFilter::default())
        .await
        .unwrap_or_default()
        .into_iter()
        .find(|role| role.name() == role_name)
        .unwrap_or_else(|| panic!("role '{role_name}' is not seeded"));

    let inserted = AssignmentRepository::insert_active_assignment(
        harness.store.as_ref(),
        NewAssignment {
            subject: identity.user_id(),
            role_id: role.role_id,
            chapter_id: None,
            branch_id,
            start_date: Utc::now(),
            end_date: None,
            granted_by: identity.user_id(),
            notes: None,
        },
    )
    .await;
    assert!(matches!(inserted, Ok(Some(_))));

    identity
}

async fn role_id_of(harness: &Harness, role_name: &str) -> String {
    RoleRepository::list_roles(harness.store.as_ref(), &RoleFilter::default())
        .await
        .unwrap_or_default()
        .into_iter()
        .find(|role| role.name() == role_name)
        .map(|role| role.role_id.to_string())
        .unwrap_or_else(|| panic!("role '{role_name}' is not seeded"))
}

fn grant_request(subject: UserId, role_id: &str, branch_id: Option<BranchId>) -> GrantAssignmentRequest {
    GrantAssignmentRequest {
        subject: subject.to_string(),
        role_id: role_id.to_owned(),
        chapter_id: None,
        branch_id: branch_id.map(|id| id.to_string()),
        start_date: None,
        end_date: None,
        notes: None,
    }
}

#[tokio::test]
async fn health_handler_reports_ok() {
    let Json(response) = health::health_handler().await;
    assert_eq!(response.status, "ok");
}

#[tokio::test]
async fn registration_and_login_issue_bearer_token() {
    let harness = harness().await;

    let registered = auth::register_handler(
        State(harness.state.clone()),
        Json(RegisterRequest {
            email: "ada@example.org".to_owned(),
            password: PASSWORD.to_owned(),
            full_name: "Ada Obi".to_owned(),
            branch_id: harness.branch.branch_id.to_string(),
        }),
    )
    .await;
    assert_eq!(registered.into_response().status(), StatusCode::CREATED);

    let login = auth::login_handler(
        State(harness.state.clone()),
        Json(LoginRequest {
            email: "ada@example.org".to_owned(),
            password: PASSWORD.to_owned(),
        }),
    )
    .await;
    let Ok(Json(login)) = login else {
        panic!("login should succeed");
    };
    assert_eq!(login.token_type, "bearer");
    assert!(!login.access_token.is_empty());
    assert_eq!(login.user.status, "pending_approval");

    let identity = harness
        .state
        .user_service
        .authenticate(&login.access_token)
        .await
        .unwrap_or_else(|error| panic!("authenticate failed: {error}"));
    let me = auth::me_handler(State(harness.state.clone()), Extension(identity)).await;
    assert!(matches!(me, Ok(Json(user)) if user.email == "ada@example.org"));
}

#[tokio::test]
async fn malformed_registration_is_unprocessable() {
    let harness = harness().await;

    let response = auth::register_handler(
        State(harness.state.clone()),
        Json(RegisterRequest {
            email: "ada@example.org".to_owned(),
            password: PASSWORD.to_owned(),
            full_name: "Ada Obi".to_owned(),
            branch_id: "leeds".to_owned(),
        }),
    )
    .await;

    assert_eq!(
        response.into_response().status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let harness = harness().await;
    member_in(&harness, "ada@example.org", harness.branch.branch_id, false).await;

    let response = auth::login_handler(
        State(harness.state.clone()),
        Json(LoginRequest {
            email: "ada@example.org".to_owned(),
            password: "Wrong2026Pass".to_owned(),
        }),
    )
    .await;

    assert_eq!(response.into_response().status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_token() {
    let harness = harness().await;
    let (_, token) = member_in(&harness, "ada@example.org", harness.branch.branch_id, true).await;

    let response = auth::logout_handler(
        State(harness.state.clone()),
        Extension(BearerToken(token.clone())),
    )
    .await;
    assert_eq!(response.into_response().status(), StatusCode::OK);

    assert!(harness.state.user_service.authenticate(&token).await.is_err());
}

#[tokio::test]
async fn unapproved_member_is_rejected_by_resource_handlers() {
    let harness = harness().await;
    let (pending, _) = member_in(&harness, "ada@example.org", harness.branch.branch_id, false).await;

    let permissions =
        me::my_permissions_handler(State(harness.state.clone()), Extension(pending.clone())).await;
    assert_eq!(permissions.into_response().status(), StatusCode::FORBIDDEN);

    let branches = branches::list_branches_handler(
        State(harness.state.clone()),
        Extension(pending),
        Query(Default::default()),
    )
    .await;
    assert_eq!(branches.into_response().status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn chairman_has_chapter_wide_scope() {
    let harness = harness().await;
    let chairman = holder(&harness, "chair@example.org", "Chairman", None).await;

    let scope = me::my_scope_handler(State(harness.state.clone()), Extension(chairman.clone())).await;
    let Ok(Json(scope)) = scope else {
        panic!("scope should resolve");
    };
    assert!(scope.is_all);
    assert_eq!(scope.scope, vec!["all".to_owned()]);

    let permissions =
        me::my_permissions_handler(State(harness.state.clone()), Extension(chairman)).await;
    let Ok(Json(permissions)) = permissions else {
        panic!("permissions should resolve");
    };
    assert!(permissions.permissions.contains_key("assignments"));
    assert!(
        permissions
            .permissions
            .get("members")
            .is_some_and(|actions| actions.iter().any(|action| action == "approve"))
    );
}

#[tokio::test]
async fn branch_member_sees_own_branch_scope() {
    let harness = harness().await;
    let secretary = holder(
        &harness,
        "sec@example.org",
        "Branch Secretary",
        Some(harness.branch.branch_id),
    )
    .await;

    let scope = me::my_scope_handler(State(harness.state.clone()), Extension(secretary)).await;

    assert!(matches!(
        scope,
        Ok(Json(scope)) if !scope.is_all && scope.scope == vec![harness.branch.branch_id.to_string()]
    ));
}

#[tokio::test]
async fn grant_validates_branch_and_rejects_duplicates() {
    let harness = harness().await;
    let chairman = holder(&harness, "chair@example.org", "Chairman", None).await;
    let secretary_role = role_id_of(&harness, "Branch Secretary").await;
    let subject = UserId::new();

    let missing_branch = assignments::grant_assignment_handler(
        State(harness.state.clone()),
        Extension(chairman.clone()),
        Json(grant_request(subject, &secretary_role, None)),
    )
    .await;
    assert_eq!(
        missing_branch.into_response().status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let granted = assignments::grant_assignment_handler(
        State(harness.state.clone()),
        Extension(chairman.clone()),
        Json(grant_request(subject, &secretary_role, Some(harness.branch.branch_id))),
    )
    .await;
    assert_eq!(granted.into_response().status(), StatusCode::CREATED);

    let duplicate = assignments::grant_assignment_handler(
        State(harness.state.clone()),
        Extension(chairman),
        Json(grant_request(subject, &secretary_role, Some(harness.branch.branch_id))),
    )
    .await;
    assert_eq!(duplicate.into_response().status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn treasurer_cannot_grant_roles() {
    let harness = harness().await;
    let treasurer = holder(&harness, "treasurer@example.org", "Treasurer", None).await;
    let secretary_role = role_id_of(&harness, "Secretary").await;

    let response = assignments::grant_assignment_handler(
        State(harness.state.clone()),
        Extension(treasurer),
        Json(grant_request(UserId::new(), &secretary_role, None)),
    )
    .await;

    assert_eq!(response.into_response().status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bulk_grant_reports_each_item() {
    let harness = harness().await;
    let chairman = holder(&harness, "chair@example.org", "Chairman", None).await;
    let treasurer_role = role_id_of(&harness, "Treasurer").await;
    let subject = UserId::new();

    let response = assignments::bulk_grant_handler(
        State(harness.state.clone()),
        Extension(chairman.clone()),
        Json(BulkGrantRequest {
            assignments: vec![
                grant_request(subject, &treasurer_role, None),
                grant_request(subject, &treasurer_role, None),
                grant_request(UserId::new(), &treasurer_role, None),
            ],
        }),
    )
    .await;
    let Ok(Json(response)) = response else {
        panic!("bulk grant should succeed");
    };
    assert_eq!(response.granted, 2);
    assert_eq!(response.failed, 1);
    assert!(response.results[0].granted);
    assert!(!response.results[1].granted);
    assert_eq!(response.results[1].index, 1);
    assert!(response.results[2].granted);

    let malformed = assignments::bulk_grant_handler(
        State(harness.state.clone()),
        Extension(chairman),
        Json(BulkGrantRequest {
            assignments: vec![GrantAssignmentRequest {
                subject: "someone".to_owned(),
                ..grant_request(UserId::new(), &treasurer_role, None)
            }],
        }),
    )
    .await;
    assert_eq!(
        malformed.into_response().status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn deactivated_assignment_stays_listable() {
    let harness = harness().await;
    let chairman = holder(&harness, "chair@example.org", "Chairman", None).await;
    let treasurer_role = role_id_of(&harness, "Treasurer").await;
    let subject = UserId::new();

    let granted = assignments::grant_assignment_handler(
        State(harness.state.clone()),
        Extension(chairman.clone()),
        Json(grant_request(subject, &treasurer_role, None)),
    )
    .await;
    let Ok((_, Json(granted))) = granted else {
        panic!("grant should succeed");
    };

    let revoked = assignments::revoke_assignment_handler(
        State(harness.state.clone()),
        Extension(chairman.clone()),
        Path(granted.assignment_id.clone()),
    )
    .await;
    assert!(matches!(revoked, Ok(Json(assignment)) if !assignment.is_active && assignment.end_date.is_some()));

    let active = users::list_user_assignments_handler(
        State(harness.state.clone()),
        Extension(chairman.clone()),
        Path(subject.to_string()),
        Query(AssignmentListQuery { active_only: true }),
    )
    .await;
    assert!(matches!(active, Ok(Json(assignments)) if assignments.is_empty()));

    let history = users::list_user_assignments_handler(
        State(harness.state.clone()),
        Extension(chairman),
        Path(subject.to_string()),
        Query(AssignmentListQuery { active_only: false }),
    )
    .await;
    assert!(matches!(
        history,
        Ok(Json(assignments)) if assignments.len() == 1
            && assignments[0].role_name.as_deref() == Some("Treasurer")
    ));
}

#[tokio::test]
async fn branch_leader_approves_members_only_in_own_branch() {
    let harness = harness().await;
    let other = seed_branch(&harness.store, "Bristol").await;
    let secretary = holder(
        &harness,
        "sec@example.org",
        "Branch Secretary",
        Some(harness.branch.branch_id),
    )
    .await;
    let (elsewhere, _) = member_in(&harness, "bo@example.org", other.branch_id, false).await;
    let (local, _) = member_in(&harness, "cy@example.org", harness.branch.branch_id, false).await;

    let refused = branches::approve_member_handler(
        State(harness.state.clone()),
        Extension(secretary.clone()),
        Path((other.branch_id.to_string(), elsewhere.user_id().to_string())),
    )
    .await;
    assert_eq!(refused.into_response().status(), StatusCode::FORBIDDEN);

    let approved = branches::approve_member_handler(
        State(harness.state.clone()),
        Extension(secretary),
        Path((harness.branch.branch_id.to_string(), local.user_id().to_string())),
    )
    .await;
    assert!(matches!(approved, Ok(Json(membership)) if membership.status == "active"));
}

#[tokio::test]
async fn role_creation_requires_roles_permission() {
    let harness = harness().await;
    let treasurer = holder(&harness, "treasurer@example.org", "Treasurer", None).await;
    let chairman = holder(&harness, "chair@example.org", "Chairman", None).await;
    let request = || CreateRoleRequest {
        name: "Events Coordinator".to_owned(),
        scope_kind: "both".to_owned(),
        category: Some("Committee".to_owned()),
        description: None,
        permissions: json!({"events": ["read", "write"]}),
    };

    let refused = roles::create_role_handler(
        State(harness.state.clone()),
        Extension(treasurer),
        Json(request()),
    )
    .await;
    assert_eq!(refused.into_response().status(), StatusCode::FORBIDDEN);

    let created = roles::create_role_handler(
        State(harness.state.clone()),
        Extension(chairman.clone()),
        Json(request()),
    )
    .await;
    assert_eq!(created.into_response().status(), StatusCode::CREATED);

    let duplicate = roles::create_role_handler(
        State(harness.state.clone()),
        Extension(chairman.clone()),
        Json(request()),
    )
    .await;
    assert_eq!(duplicate.into_response().status(), StatusCode::CONFLICT);

    let listed = roles::list_roles_handler(
        State(harness.state.clone()),
        Extension(chairman),
        Query(RoleListQuery {
            scope_kind: Some("both".to_owned()),
            category: None,
        }),
    )
    .await;
    assert!(matches!(
        listed,
        Ok(Json(roles)) if roles.iter().any(|role| role.name == "Events Coordinator")
            && roles.iter().all(|role| role.scope_kind == "both")
    ));
}

#[tokio::test]
async fn unknown_role_is_not_found() {
    let harness = harness().await;
    let chairman = holder(&harness, "chair@example.org", "Chairman", None).await;

    let missing = roles::get_role_handler(
        State(harness.state.clone()),
        Extension(chairman.clone()),
        Path(chapterdesk_domain::RoleId::new().to_string()),
    )
    .await;
    assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

    let malformed = roles::get_role_handler(
        State(harness.state.clone()),
        Extension(chairman),
        Path("chairman".to_owned()),
    )
    .await;
    assert_eq!(
        malformed.into_response().status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn approving_a_user_updates_status() {
    let harness = harness().await;
    let secretary = holder(&harness, "sec@example.org", "Secretary", None).await;
    let (pending, _) = member_in(&harness, "ada@example.org", harness.branch.branch_id, false).await;

    let response = users::update_user_status_handler(
        State(harness.state.clone()),
        Extension(secretary),
        Path(pending.user_id().to_string()),
        Json(UpdateUserStatusRequest {
            status: "approved".to_owned(),
        }),
    )
    .await;

    assert!(matches!(response, Ok(Json(user)) if user.status == "approved"));
}

#[tokio::test]
async fn grant_without_authority_is_forbidden_before_role_lookup() {
    let harness = harness().await;
    let treasurer = holder(&harness, "treasurer@example.org", "Treasurer", None).await;
    let branch_role = role_id_of(&harness, "Branch Secretary").await;

    for role_id in [chapterdesk_domain::RoleId::new().to_string(), branch_role] {
        let response = assignments::grant_assignment_handler(
            State(harness.state.clone()),
            Extension(treasurer.clone()),
            Json(grant_request(UserId::new(), &role_id, None)),
        )
        .await;
        assert_eq!(response.into_response().status(), StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn member_listing_pages_and_membership_updates() {
    let harness = harness().await;
    let chairman = holder(&harness, "chair@example.org", "Chairman", None).await;
    member_in(&harness, "ada@example.org", harness.branch.branch_id, false).await;

    let listed = branches::list_branch_members_handler(
        State(harness.state.clone()),
        Extension(chairman.clone()),
        Path(harness.branch.branch_id.to_string()),
        Query(MemberListQuery {
            status: Some("pending".to_owned()),
            page: Some(1),
            size: Some(1),
        }),
    )
    .await
    .unwrap_or_else(|error| panic!("listing failed: {error:?}"));
    let Json(listed) = listed;
    assert_eq!((listed.total, listed.members.len(), listed.size), (2, 1, 1));
    let membership_id = listed.members[0].membership.membership_id.clone();

    let fetched = branches::get_membership_handler(
        State(harness.state.clone()),
        Extension(chairman.clone()),
        Path(membership_id.clone()),
    )
    .await;
    assert!(matches!(fetched, Ok(Json(membership)) if membership.status == "pending"));

    let updated = branches::update_membership_handler(
        State(harness.state.clone()),
        Extension(chairman),
        Path(membership_id),
        Json(UpdateMembershipRequest {
            status: Some("active".to_owned()),
            card_issued: Some(true),
        }),
    )
    .await;
    assert!(matches!(
        updated,
        Ok(Json(membership)) if membership.status == "active" && membership.card_issued
    ));
}

#[tokio::test]
async fn user_directory_follows_leadership_scope() {
    let harness = harness().await;
    let other = seed_branch(&harness.store, "Bristol").await;
    let secretary = holder(
        &harness,
        "sec@example.org",
        "Branch Secretary",
        Some(harness.branch.branch_id),
    )
    .await;
    let (elsewhere, _) = member_in(&harness, "bo@example.org", other.branch_id, false).await;

    let scoped = users::list_users_handler(
        State(harness.state.clone()),
        Extension(secretary.clone()),
        Query(UserListQuery::default()),
    )
    .await;
    assert!(matches!(
        scoped,
        Ok(Json(page)) if page.total == 1 && page.users[0].user_id == secretary.user_id().to_string()
    ));

    let refused = users::list_users_handler(
        State(harness.state.clone()),
        Extension(secretary.clone()),
        Query(UserListQuery {
            branch_id: Some(other.branch_id.to_string()),
            ..UserListQuery::default()
        }),
    )
    .await;
    assert_eq!(refused.into_response().status(), StatusCode::FORBIDDEN);

    let fetched = users::get_user_handler(
        State(harness.state.clone()),
        Extension(secretary),
        Path(elsewhere.user_id().to_string()),
    )
    .await;
    assert!(matches!(fetched, Ok(Json(user)) if user.status == "pending_approval"));
}

#[tokio::test]
async fn members_rename_themselves() {
    let harness = harness().await;
    let (member, _) = member_in(&harness, "ada@example.org", harness.branch.branch_id, true).await;

    let renamed = users::update_my_profile_handler(
        State(harness.state.clone()),
        Extension(member.clone()),
        Json(UpdateProfileRequest {
            full_name: Some("Ada Okafor".to_owned()),
        }),
    )
    .await;
    assert!(matches!(renamed, Ok(Json(user)) if user.full_name == "Ada Okafor"));

    let empty = users::update_my_profile_handler(
        State(harness.state.clone()),
        Extension(member),
        Json(UpdateProfileRequest { full_name: None }),
    )
    .await;
    assert_eq!(
        empty.into_response().status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn subject_permissions_and_summary_need_viewing_rights() {
    let harness = harness().await;
    let chairman = holder(&harness, "chair@example.org", "Chairman", None).await;
    let treasurer = holder(&harness, "treasurer@example.org", "Treasurer", None).await;

    let refused = users::user_permissions_handler(
        State(harness.state.clone()),
        Extension(treasurer.clone()),
        Path(chairman.user_id().to_string()),
    )
    .await;
    assert_eq!(refused.into_response().status(), StatusCode::FORBIDDEN);

    let own = users::user_permissions_handler(
        State(harness.state.clone()),
        Extension(treasurer.clone()),
        Path(treasurer.user_id().to_string()),
    )
    .await;
    assert!(own.is_ok());

    let summary = users::user_assignments_summary_handler(
        State(harness.state.clone()),
        Extension(chairman.clone()),
        Path(treasurer.user_id().to_string()),
    )
    .await;
    assert!(matches!(
        summary,
        Ok(Json(summary)) if summary.total == 1
            && summary.assignments[0].role_name.as_deref() == Some("Treasurer")
    ));

    let categories = roles::list_role_categories_handler(
        State(harness.state.clone()),
        Extension(chairman),
    )
    .await;
    assert!(matches!(
        categories,
        Ok(Json(categories)) if categories.iter().any(|category| category.role_count > 1)
    ));
}
