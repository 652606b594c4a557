//! Storage abstractions for service layer
//!
//! A collection is an ordered sequence of records persisted as one unit.
//! Services load the whole collection before an operation and save the
//! whole collection after a mutation; stores never see partial updates.

pub mod json_file_store;
pub mod memory_store;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use crate::errors::ServiceError;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;

/// Records addressable by a string identifier.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// One stored element of a collection.
///
/// Elements that decode as `T` are `Typed`; anything else in the array is
/// kept as `Raw` and written back unchanged on the next save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record<T> {
    Typed(T),
    Raw(Value),
}

impl<T> Record<T> {
    pub fn typed(&self) -> Option<&T> {
        match self {
            Record::Typed(t) => Some(t),
            Record::Raw(_) => None,
        }
    }

    pub fn typed_mut(&mut self) -> Option<&mut T> {
        match self {
            Record::Typed(t) => Some(t),
            Record::Raw(_) => None,
        }
    }

    pub fn into_typed(self) -> Option<T> {
        match self {
            Record::Typed(t) => Some(t),
            Record::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool { matches!(self, Record::Raw(_)) }
}

impl<T: Keyed> Record<T> {
    /// String identifier of the element. A raw element only has one when
    /// its `id` member is a JSON string.
    pub fn key(&self) -> Option<&str> {
        match self {
            Record::Typed(t) => Some(t.key()),
            Record::Raw(v) => v.get("id").and_then(Value::as_str),
        }
    }
}

/// One named collection of `T` records.
///
/// `load` is fail-open: a missing or unreadable backing resource yields an
/// empty collection instead of an error. `save` replaces the whole
/// collection. Implementations do no locking, so two concurrent
/// load/save cycles on the same collection can lose an update.
#[async_trait]
pub trait CollectionStore<T: Send + Sync>: Send + Sync {
    /// Collection name, used in logs.
    fn name(&self) -> &str;
    async fn load(&self) -> Vec<Record<T>>;
    async fn save(&self, records: &[Record<T>]) -> Result<(), ServiceError>;
}

/// Optional per-collection critical section around load/mutate/save.
///
/// Disabled by default; when enabled, mutations of one collection through
/// the same service are applied one at a time.
#[derive(Clone, Default)]
pub struct WriteGate(Option<Arc<Mutex<()>>>);

impl WriteGate {
    pub fn disabled() -> Self { Self(None) }

    pub fn enabled() -> Self { Self(Some(Arc::new(Mutex::new(())))) }

    pub fn is_enabled(&self) -> bool { self.0.is_some() }

    /// Hold the returned guard for the whole read-modify-write cycle.
    pub async fn enter(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.0 {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Tag {
        id: String,
        label: String,
    }

    impl Keyed for Tag {
        fn key(&self) -> &str { &self.id }
    }

    #[test]
    fn off_shape_elements_decode_as_raw() -> Result<(), anyhow::Error> {
        let records: Vec<Record<Tag>> = serde_json::from_value(json!([
            {"id": "a", "label": "first"},
            {"id": 1, "label": "numeric id"},
            {"id": "b"},
            "loose string"
        ]))?;
        assert_eq!(records[0], Record::Typed(Tag { id: "a".into(), label: "first".into() }));
        assert!(records[1].is_raw() && records[2].is_raw() && records[3].is_raw());

        assert_eq!(records[0].key(), Some("a"));
        assert_eq!(records[1].key(), None);
        assert_eq!(records[2].key(), Some("b"));
        assert_eq!(records[3].key(), None);

        // raw elements serialize back verbatim
        assert_eq!(serde_json::to_value(&records[1])?, json!({"id": 1, "label": "numeric id"}));
        Ok(())
    }

    #[tokio::test]
    async fn disabled_gate_never_blocks() {
        let gate = WriteGate::disabled();
        assert!(!gate.is_enabled());
        let a = gate.enter().await;
        let b = gate.enter().await;
        assert!(a.is_none() && b.is_none());
    }

    #[tokio::test]
    async fn enabled_gate_is_exclusive() {
        let gate = WriteGate::enabled();
        let held = gate.enter().await;
        assert!(held.is_some());
        let second = tokio::time::timeout(std::time::Duration::from_millis(20), gate.enter()).await;
        assert!(second.is_err());
        drop(held);
        assert!(gate.enter().await.is_some());
    }
}
