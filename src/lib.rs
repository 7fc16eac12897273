pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod messages;
pub mod middleware;
pub mod outcome;
pub mod server;
pub mod services;

#[cfg(test)]
pub mod testing;

use axum::{
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub use handlers::AppState;

/// Full application router: public routes, token-protected `/api/*`
/// routes, CORS and request tracing.
pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/api/users/register", post(public::register))
        .route("/api/users/login", post(public::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(project_routes())
        .merge(sprint_routes())
        .merge(work_item_routes())
        .merge(tag_routes())
        .route_layer(from_fn_with_state(state, middleware::jwt_auth_middleware))
}

fn user_routes() -> Router<AppState> {
    use handlers::protected::users;

    Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/users/me", get(users::current_user))
        .route("/api/users/by-username/:username", get(users::get_user_by_username))
        .route(
            "/api/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/api/users/:id/change-password", put(users::change_password))
}

fn project_routes() -> Router<AppState> {
    use axum::routing::delete;
    use handlers::protected::projects;

    Router::new()
        .route("/api/project", get(projects::list_projects).post(projects::create_project))
        .route("/api/project/owned", get(projects::owned_projects))
        .route("/api/project/participating", get(projects::participating_projects))
        .route(
            "/api/project/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/api/project/:id/participants",
            get(projects::get_participants).post(projects::add_participant),
        )
        .route("/api/project/:id/participants/:user_id", delete(projects::remove_participant))
}

fn sprint_routes() -> Router<AppState> {
    use handlers::protected::sprints;

    Router::new()
        .route("/api/sprint", get(sprints::list_sprints).post(sprints::create_sprint))
        .route("/api/sprint/active", get(sprints::active_sprints))
        .route("/api/sprint/date-range", get(sprints::sprints_in_range))
        .route("/api/sprint/project/:project_id", get(sprints::project_sprints))
        .route(
            "/api/sprint/:id",
            get(sprints::get_sprint)
                .put(sprints::update_sprint)
                .delete(sprints::delete_sprint),
        )
}

fn work_item_routes() -> Router<AppState> {
    use axum::routing::delete;
    use handlers::protected::work_items;

    Router::new()
        .route(
            "/api/workitem",
            get(work_items::list_work_items).post(work_items::create_work_item),
        )
        .route("/api/workitem/project/:project_id", get(work_items::project_work_items))
        .route("/api/workitem/sprint/:sprint_id", get(work_items::sprint_work_items))
        .route("/api/workitem/state/:state", get(work_items::work_items_in_state))
        .route("/api/workitem/assigned/:user_id", get(work_items::assigned_work_items))
        .route(
            "/api/workitem/:id",
            get(work_items::get_work_item)
                .put(work_items::update_work_item)
                .delete(work_items::delete_work_item),
        )
        .route("/api/workitem/:id/assign", post(work_items::assign_user))
        .route("/api/workitem/:id/unassign/:user_id", delete(work_items::unassign_user))
        .route("/api/workitem/:id/tags", post(work_items::add_tag))
        .route("/api/workitem/:id/tags/:tag_id", delete(work_items::remove_tag))
        .route("/api/workitem/:id/sprint", put(work_items::move_to_sprint))
        .route("/api/workitem/:id/index", put(work_items::update_index))
}

fn tag_routes() -> Router<AppState> {
    use handlers::protected::tags;

    Router::new()
        .route("/api/tag", get(tags::list_tags).post(tags::create_tag))
        .route("/api/tag/by-name/:name", get(tags::get_tag_by_name))
        .route(
            "/api/tag/:id",
            get(tags::get_tag).put(tags::update_tag).delete(tags::delete_tag),
        )
}

/// `*` or an empty list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::permissive().allow_origin(AllowOrigin::list(allowed))
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "AgileBoard API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Project management backend: projects, sprints, work items and tags",
            "endpoints": {
                "users": "/api/users (register and login are public)",
                "projects": "/api/project (protected)",
                "sprints": "/api/sprint (protected)",
                "work_items": "/api/workitem (protected)",
                "tags": "/api/tag (protected)",
            }
        }
    }))
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "store": backend }
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "store unavailable",
                    "data": { "status": "degraded", "timestamp": now, "store": backend }
                })),
            )
        }
    }
}
