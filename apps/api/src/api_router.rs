use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use chapterdesk_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

use cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/branches/public",
            get(handlers::branches::list_public_branches_handler),
        )
        .route("/api/auth/register", post(handlers::auth::register_handler))
        .route("/api/auth/login", post(handlers::auth::login_handler));

    let session_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout_handler))
        .route("/api/auth/me", get(handlers::auth::me_handler))
        .route(
            "/api/users/me",
            get(handlers::auth::me_handler).put(handlers::users::update_my_profile_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let member_routes = Router::new()
        .route(
            "/api/me/permissions",
            get(handlers::me::my_permissions_handler),
        )
        .route("/api/me/scope", get(handlers::me::my_scope_handler))
        .route(
            "/api/me/assignments",
            get(handlers::me::my_assignments_handler),
        )
        .route(
            "/api/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/api/roles/categories",
            get(handlers::roles::list_role_categories_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(handlers::roles::get_role_handler).put(handlers::roles::update_role_handler),
        )
        .route(
            "/api/assignments",
            post(handlers::assignments::grant_assignment_handler),
        )
        .route(
            "/api/assignments/bulk",
            post(handlers::assignments::bulk_grant_handler),
        )
        .route(
            "/api/assignments/{assignment_id}",
            get(handlers::assignments::get_assignment_handler)
                .put(handlers::assignments::update_assignment_handler)
                .delete(handlers::assignments::revoke_assignment_handler),
        )
        .route(
            "/api/assignments/{assignment_id}/deactivate",
            post(handlers::assignments::revoke_assignment_handler),
        )
        .route("/api/users", get(handlers::users::list_users_handler))
        .route("/api/users/{user_id}", get(handlers::users::get_user_handler))
        .route(
            "/api/users/{user_id}/permissions",
            get(handlers::users::user_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/assignments",
            get(handlers::users::list_user_assignments_handler),
        )
        .route(
            "/api/users/{user_id}/assignments/summary",
            get(handlers::users::user_assignments_summary_handler),
        )
        .route(
            "/api/users/{user_id}/status",
            put(handlers::users::update_user_status_handler),
        )
        .route(
            "/api/branches",
            get(handlers::branches::list_branches_handler)
                .post(handlers::branches::create_branch_handler),
        )
        .route(
            "/api/branches/mine",
            get(handlers::branches::list_my_branches_handler),
        )
        .route(
            "/api/branches/memberships/{membership_id}",
            get(handlers::branches::get_membership_handler)
                .put(handlers::branches::update_membership_handler),
        )
        .route(
            "/api/branches/{branch_id}",
            get(handlers::branches::get_branch_handler)
                .put(handlers::branches::update_branch_handler)
                .delete(handlers::branches::deactivate_branch_handler),
        )
        .route(
            "/api/branches/{branch_id}/members",
            get(handlers::branches::list_branch_members_handler)
                .post(handlers::branches::add_member_handler),
        )
        .route(
            "/api/branches/{branch_id}/members/{user_id}/approve",
            put(handlers::branches::approve_member_handler),
        )
        .route(
            "/api/branches/{branch_id}/members/{user_id}/card",
            post(handlers::branches::issue_membership_card_handler),
        )
        .route_layer(from_fn(middleware::require_approved))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let cors_layer = build_cors_layer(frontend_url)?;

    Ok(Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(member_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
