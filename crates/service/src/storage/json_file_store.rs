use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use super::{CollectionStore, Record};
use crate::errors::ServiceError;

/// JSON file-backed collection.
///
/// The whole collection lives in one file as a pretty-printed JSON array.
/// Reads are fail-open at the file level: a missing file or a body that is
/// not a JSON array reads as empty. Elements that do not fit `T` are kept
/// as raw values rather than dropping the collection. Writes go to a sibling temp file that is renamed
/// over the target, so a reader never observes a half-written array.
pub struct JsonFileStore<T> {
    name: String,
    file_path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    /// Bind a collection to a file path. Nothing is touched on disk until
    /// the first save; a missing file reads as an empty collection.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let file_path = path.into();
        let name = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_path.to_string_lossy().into_owned());
        Self { name, file_path, _records: PhantomData }
    }

    pub fn path(&self) -> &Path { &self.file_path }
}

fn temp_path(path: &Path) -> PathBuf {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    path.with_extension(format!("{ext}.{}.tmp", uuid::Uuid::new_v4().simple()))
}

#[async_trait]
impl<T> CollectionStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn name(&self) -> &str { &self.name }

    async fn load(&self) -> Vec<Record<T>> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(collection = %self.name, path = %self.file_path.display(), "collection file absent, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(collection = %self.name, path = %self.file_path.display(), error = %e, "collection file unreadable, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Vec<Record<T>>>(&bytes) {
            Ok(records) => {
                let raw = records.iter().filter(|r| r.is_raw()).count();
                if raw > 0 {
                    warn!(collection = %self.name, raw, "collection holds records of unexpected shape, keeping them as-is");
                }
                debug!(collection = %self.name, count = records.len(), "collection loaded");
                records
            }
            Err(e) => {
                warn!(collection = %self.name, path = %self.file_path.display(), error = %e, "collection file unparseable, treating as empty");
                Vec::new()
            }
        }
    }

    async fn save(&self, records: &[Record<T>]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(records).map_err(|e| ServiceError::Storage(e.to_string()))?;
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        }
        let tmp = temp_path(&self.file_path);
        if let Err(e) = fs::write(&tmp, &data).await {
            return Err(ServiceError::Storage(format!("write {}: {e}", tmp.display())));
        }
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::Storage(format!("replace {}: {e}", self.file_path.display())));
        }
        debug!(collection = %self.name, count = records.len(), "collection saved");
        Ok(())
    }
}
