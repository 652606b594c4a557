use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CollectionStore, Record};
use crate::errors::ServiceError;

/// In-memory collection, for tests and ephemeral runs.
pub struct MemoryStore<T> {
    name: String,
    records: RwLock<Vec<Record<T>>>,
}

impl<T> MemoryStore<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_records(name, Vec::new())
    }

    pub fn with_records(name: impl Into<String>, records: Vec<T>) -> Self {
        Self::with_stored(name, records.into_iter().map(Record::Typed).collect())
    }

    /// Seed with stored elements as-is, raw ones included.
    pub fn with_stored(name: impl Into<String>, records: Vec<Record<T>>) -> Self {
        Self { name: name.into(), records: RwLock::new(records) }
    }
}

#[async_trait]
impl<T> CollectionStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync,
{
    fn name(&self) -> &str { &self.name }

    async fn load(&self) -> Vec<Record<T>> {
        self.records.read().await.clone()
    }

    async fn save(&self, records: &[Record<T>]) -> Result<(), ServiceError> {
        *self.records.write().await = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_replaces_whole_collection() -> Result<(), anyhow::Error> {
        let store = MemoryStore::with_records("numbers", vec![1, 2, 3]);
        assert_eq!(store.name(), "numbers");
        assert_eq!(store.load().await, vec![Record::Typed(1), Record::Typed(2), Record::Typed(3)]);

        store.save(&[Record::Typed(7), Record::Raw(serde_json::json!("x"))]).await?;
        assert_eq!(store.load().await, vec![Record::Typed(7), Record::Raw(serde_json::json!("x"))]);

        store.save(&[]).await?;
        assert!(store.load().await.is_empty());
        Ok(())
    }
}
