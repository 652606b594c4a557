use std::sync::Arc;

use axum::Router;
use configs::{AppConfig, StorageConfig};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::{
    comments::{Comment, CommentService},
    runtime,
    storage::{CollectionStore, JsonFileStore},
    users::{User, UserService},
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the file-backed collections described by `storage` into services.
pub fn build_state(storage: &StorageConfig) -> AppState {
    let users_store: Arc<dyn CollectionStore<User>> = Arc::new(JsonFileStore::<User>::new(storage.users_path()));
    let comments_store: Arc<dyn CollectionStore<Comment>> =
        Arc::new(JsonFileStore::<Comment>::new(storage.comments_path()));

    let mut users = UserService::new(users_store);
    let mut comments = CommentService::new(comments_store);
    if storage.serialize_writes {
        users = users.with_serialized_writes();
        comments = comments.with_serialized_writes();
    }
    AppState { users, comments }
}

/// Router over the configured storage, without binding a socket.
pub fn build_app(cfg: &AppConfig) -> Router {
    routes::build_router(build_state(&cfg.storage), build_cors(), &cfg.storage.public_dir)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
    }
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    runtime::ensure_env(&cfg.storage.public_dir, &cfg.storage.data_dir).await?;

    let app = build_app(&cfg);

    let addr = cfg.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;
    info!(
        %addr,
        users = %cfg.storage.users_path().display(),
        comments = %cfg.storage.comments_path().display(),
        serialize_writes = cfg.storage.serialize_writes,
        "comments api listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
