use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Map, Value};
use service::{storage::Record, users::User};

use super::AppState;
use crate::errors::ApiError;

#[utoipa::path(get, path = "/users", tag = "users", responses((status = 200, description = "All users in storage order")))]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<Record<User>>> {
    Json(state.users.list().await)
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = crate::openapi::NewUserDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Missing field or duplicate id", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(fields) = payload?;
    let user = state.users.create(fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "User created successfully", "user": user})),
    ))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses((status = 200, description = "Found"), (status = 404, description = "Not found", body = crate::openapi::ErrorDoc))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user = state.users.get(&id).await?;
    Ok(Json(json!({"user": user})))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    request_body = crate::openapi::UserPatchDoc,
    responses((status = 200, description = "Merged"), (status = 404, description = "Not found", body = crate::openapi::ErrorDoc))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(partial) = payload?;
    let user = state.users.update(&id, partial).await?;
    Ok(Json(json!({"message": "User updated successfully", "user": user})))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found", body = crate::openapi::ErrorDoc))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.users.delete(&id).await?;
    Ok(Json(json!({"message": "User deleted successfully"})))
}
