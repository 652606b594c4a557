pub mod comments;
pub mod users;

use std::path::Path;

use axum::{
    routing::{delete, get},
    Json, Router,
};
use common::types::ServiceStatus;
use service::{comments::CommentService, users::UserService};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::openapi::ApiDoc;

pub const STATUS_MESSAGE: &str = "Comments API is running";

/// Shared handler state: one service per collection.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub comments: CommentService,
}

#[utoipa::path(get, path = "/api/status", tag = "status", responses((status = 200, description = "Service is up", body = crate::openapi::StatusDoc)))]
pub async fn status() -> Json<ServiceStatus> {
    Json(ServiceStatus::up(STATUS_MESSAGE))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: JSON APIs plus the static comments page.
pub fn build_router(state: AppState, cors: CorsLayer, public_dir: impl AsRef<Path>) -> Router {
    // `/` and any other unmatched path are served from the public directory
    let static_files = ServeDir::new(public_dir.as_ref());

    let user_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        );

    let comment_routes = Router::new()
        .route("/api/comments", get(comments::list_comments).post(comments::create_comment))
        .route("/api/comments/count", get(comments::count_comments))
        .route("/api/comments/:id", delete(comments::delete_comment));

    Router::new()
        .route("/api/status", get(status))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(user_routes)
        .merge(comment_routes)
        .fallback_service(static_files)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
