use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::{CollectionStore, Keyed, Record, WriteGate};
use crate::validation;

/// A stored comment. Never modified after creation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub message: String,
    /// RFC 3339 creation instant, millisecond precision.
    pub timestamp: String,
    /// Members written by other tools; carried through saves untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Keyed for Comment {
    fn key(&self) -> &str { &self.id }
}

/// Create payload; both fields are optional here so that absence is
/// reported by validation rather than by the JSON decoder.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewComment {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewComment {
    pub fn new(author: impl Into<String>, message: impl Into<String>) -> Self {
        Self { author: Some(author.into()), message: Some(message.into()) }
    }
}

/// Millisecond clock reading as a decimal id, bumped past any id already
/// in `existing` so ids stay unique within the collection.
pub fn next_comment_id(existing: &[Record<Comment>], now_millis: i64) -> String {
    let mut candidate = now_millis;
    loop {
        let id = candidate.to_string();
        if !existing.iter().any(|c| c.key() == Some(id.as_str())) {
            return id;
        }
        candidate += 1;
    }
}

/// Create/list/delete/count over the comments collection.
#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn CollectionStore<Comment>>,
    gate: WriteGate,
}

impl CommentService {
    pub fn new(store: Arc<dyn CollectionStore<Comment>>) -> Self {
        Self { store, gate: WriteGate::disabled() }
    }

    /// Serialize mutations of this collection within the process.
    pub fn with_serialized_writes(mut self) -> Self {
        self.gate = WriteGate::enabled();
        self
    }

    /// All comments in storage order; display ordering is up to the client.
    pub async fn list(&self) -> Vec<Record<Comment>> {
        self.store.load().await
    }

    pub async fn count(&self) -> usize {
        self.store.load().await.len()
    }

    pub async fn create(&self, input: NewComment) -> Result<Comment, ServiceError> {
        let (author, message) =
            validation::validate_new_comment(input.author.as_deref(), input.message.as_deref())?;
        let _guard = self.gate.enter().await;
        let mut comments = self.store.load().await;
        let comment = Comment {
            id: next_comment_id(&comments, Utc::now().timestamp_millis()),
            author,
            message,
            timestamp: common::types::now_iso8601(),
            extra: Map::new(),
        };
        comments.push(Record::Typed(comment.clone()));
        self.store.save(&comments).await?;
        info!(collection = self.store.name(), comment_id = %comment.id, "comment created");
        Ok(comment)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let _guard = self.gate.enter().await;
        let comments = self.store.load().await;
        let before = comments.len();
        let remaining: Vec<Record<Comment>> = comments.into_iter().filter(|c| c.key() != Some(id)).collect();
        if remaining.len() == before {
            return Err(ServiceError::not_found("Comment"));
        }
        self.store.save(&remaining).await?;
        info!(collection = self.store.name(), comment_id = %id, "comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStore, MemoryStore};

    fn service() -> CommentService {
        CommentService::new(Arc::new(MemoryStore::<Comment>::new("comments")))
    }

    fn stored(id: &str) -> Comment {
        Comment {
            id: id.into(),
            author: "Ana".into(),
            message: "hello".into(),
            timestamp: "t".into(),
            extra: Map::new(),
        }
    }

    fn typed(records: Vec<Record<Comment>>) -> Vec<Comment> {
        records.into_iter().filter_map(Record::into_typed).collect()
    }

    fn ids(records: Vec<Record<Comment>>) -> Vec<String> {
        typed(records).into_iter().map(|c| c.id).collect()
    }

    #[test]
    fn id_skips_taken_values() {
        assert_eq!(next_comment_id(&[], 1000), "1000");
        let taken = vec![Record::Typed(stored("1000")), Record::Raw(serde_json::json!({"id": "1001"}))];
        assert_eq!(next_comment_id(&taken, 1000), "1002");
        assert_eq!(next_comment_id(&taken, 999), "999");
    }

    #[tokio::test]
    async fn create_trims_and_lists_the_record() -> Result<(), anyhow::Error> {
        let svc = service();
        let created = svc.create(NewComment::new("  Ana María ", "  Hola a todos  ")).await?;
        assert_eq!(created.author, "Ana María");
        assert_eq!(created.message, "Hola a todos");
        assert!(created.id.parse::<i64>().is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&created.timestamp).is_ok());

        assert_eq!(typed(svc.list().await), vec![created]);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_reports_first_failure_and_saves_nothing() {
        let svc = service();
        let cases = [
            (NewComment::default(), validation::COMMENT_FIELDS_REQUIRED),
            (NewComment::new("A", "Mensaje válido"), validation::AUTHOR_TOO_SHORT),
            (NewComment::new("Autor válido", "MSG"), validation::MESSAGE_TOO_SHORT),
        ];
        for (input, expected) in cases {
            match svc.create(input).await {
                Err(ServiceError::Validation(m)) => assert_eq!(m, expected),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
        assert_eq!(svc.count().await, 0);
    }

    #[tokio::test]
    async fn count_tracks_creations_and_ids_are_unique() -> Result<(), anyhow::Error> {
        let svc = service();
        for i in 0..3 {
            svc.create(NewComment::new(format!("Autor {i}"), format!("Mensaje número {i}"))).await?;
        }
        assert_eq!(svc.count().await, 3);

        let mut seen = ids(svc.list().await);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() -> Result<(), anyhow::Error> {
        let svc = service();
        let a = svc.create(NewComment::new("Ana", "first message")).await?;
        let b = svc.create(NewComment::new("Bo", "second message")).await?;

        svc.delete(&a.id).await?;
        assert_eq!(typed(svc.list().await), vec![b.clone()]);

        match svc.delete("nonexistent").await {
            Err(ServiceError::NotFound(m)) => assert_eq!(m, "Comment not found"),
            other => panic!("expected not found, got {other:?}"),
        }
        assert_eq!(typed(svc.list().await), vec![b]);
        Ok(())
    }

    #[tokio::test]
    async fn preexisting_records_keep_their_order() -> Result<(), anyhow::Error> {
        let store = Arc::new(MemoryStore::with_records("comments", vec![stored("3"), stored("1"), stored("2")]));
        let svc = CommentService::new(store);
        assert_eq!(ids(svc.list().await), vec!["3", "1", "2"]);

        svc.delete("1").await?;
        assert_eq!(ids(svc.list().await), vec!["3", "2"]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_members_and_off_shape_records_survive() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("comment_service_{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join("comments.json");
        tokio::fs::write(
            &path,
            br#"[
  {"id": "1", "author": "Ana", "message": "hello", "timestamp": "t", "likes": 3},
  {"id": "2", "author": "Bo"},
  {"id": 3, "author": "Cy", "message": "numeric", "timestamp": "t"}
]"#,
        )
        .await?;
        let svc = CommentService::new(Arc::new(JsonFileStore::<Comment>::new(&path)));
        assert_eq!(svc.count().await, 3);

        let created = svc.create(NewComment::new("Dee", "a new comment")).await?;
        assert_eq!(svc.count().await, 4);

        // a raw record with a string id can still be deleted
        svc.delete("2").await?;

        let on_disk: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&path).await?)?;
        let items = on_disk.as_array().cloned().unwrap_or_default();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["likes"], 3);
        assert_eq!(items[1], serde_json::json!({"id": 3, "author": "Cy", "message": "numeric", "timestamp": "t"}));
        assert_eq!(items[2]["id"], created.id.as_str());

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn serialized_writes_keep_every_concurrent_create() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("comment_service_{}", uuid::Uuid::new_v4()));
        let store = Arc::new(JsonFileStore::<Comment>::new(dir.join("comments.json")));
        let svc = CommentService::new(store).with_serialized_writes();

        let mut tasks = Vec::new();
        for i in 0..16 {
            let svc = svc.clone();
            tasks.push(tokio::spawn(async move {
                svc.create(NewComment::new(format!("Autor {i}"), "concurrent message")).await
            }));
        }
        for t in tasks {
            t.await??;
        }
        let comments = typed(svc.list().await);
        assert_eq!(comments.len(), 16);
        let mut ids: Vec<&str> = comments.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16);

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
