use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use service::{
    comments::{Comment, NewComment},
    storage::Record,
};

use super::AppState;
use crate::errors::ApiError;

#[utoipa::path(get, path = "/api/comments", tag = "comments", responses((status = 200, description = "All comments in storage order")))]
pub async fn list_comments(State(state): State<AppState>) -> Json<Vec<Record<Comment>>> {
    Json(state.comments.list().await)
}

#[utoipa::path(
    post,
    path = "/api/comments",
    tag = "comments",
    request_body = crate::openapi::NewCommentDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(input) = payload?;
    let comment = state.comments.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Comment created successfully", "comment": comment})),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    params(("id" = String, Path, description = "Comment id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found", body = crate::openapi::ErrorDoc))
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.comments.delete(&id).await?;
    Ok(Json(json!({"message": "Comment deleted successfully"})))
}

#[utoipa::path(get, path = "/api/comments/count", tag = "comments", responses((status = 200, description = "Number of stored comments", body = crate::openapi::CountDoc)))]
pub async fn count_comments(State(state): State<AppState>) -> Json<Value> {
    Json(json!({"count": state.comments.count().await}))
}
