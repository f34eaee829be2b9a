//! Document store for progress and training documents.
//!
//! Two backends: an in-memory map (default) and a directory of JSON files
//! selected with `TRAINER_STORE_DIR`. Each call reads or writes exactly one
//! whole document; there is no locking across calls.

use std::{
  collections::HashMap,
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
};

use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::progress::UserProgress;
use crate::training::{StoredTrainingRecords, TrainingCategory};
use crate::util::is_safe_key;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
  #[error("malformed document: {0}")]
  Malformed(#[from] serde_json::Error),
  #[error("invalid document key '{0}'")]
  InvalidKey(String),
}

/// Keys become file names in the JSON backend.
fn checked_key(key: &str) -> Result<&str, StoreError> {
  if is_safe_key(key) { Ok(key) } else { Err(StoreError::InvalidKey(key.to_string())) }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
  progress: Arc<RwLock<HashMap<String, UserProgress>>>,
  training: Arc<RwLock<HashMap<(String, TrainingCategory), StoredTrainingRecords>>>,
}

#[derive(Clone)]
pub struct JsonDirStore {
  root: PathBuf,
}

impl JsonDirStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  fn progress_path(&self, user_id: &str) -> Result<PathBuf, StoreError> {
    Ok(self.root.join("progress").join(format!("{}.json", checked_key(user_id)?)))
  }

  fn training_path(&self, user_id: &str, category: TrainingCategory) -> Result<PathBuf, StoreError> {
    Ok(
      self
        .root
        .join("training")
        .join(checked_key(user_id)?)
        .join(format!("{}.json", category.as_str())),
    )
  }

  async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match tokio::fs::read(path).await {
      Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  /// Write through a temp file and rename so readers never see half a document.
  async fn write_json<T: serde::Serialize>(path: &Path, doc: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(doc)?;
    if let Some(dir) = path.parent() {
      tokio::fs::create_dir_all(dir).await?;
    }
    let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
    tokio::fs::write(&tmp, &bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
      let _ = tokio::fs::remove_file(&tmp).await;
      return Err(e.into());
    }
    Ok(())
  }
}

#[derive(Clone)]
pub enum DocumentStore {
  Memory(MemoryStore),
  JsonDir(JsonDirStore),
}

impl DocumentStore {
  pub fn memory() -> Self {
    DocumentStore::Memory(MemoryStore::default())
  }

  pub fn json_dir(root: impl Into<PathBuf>) -> Self {
    DocumentStore::JsonDir(JsonDirStore::new(root))
  }

  pub fn describe(&self) -> String {
    match self {
      DocumentStore::Memory(_) => "memory".to_string(),
      DocumentStore::JsonDir(s) => format!("json_dir:{}", s.root.display()),
    }
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn load_progress(&self, user_id: &str) -> Result<Option<UserProgress>, StoreError> {
    match self {
      DocumentStore::Memory(m) => Ok(m.progress.read().await.get(user_id).cloned()),
      DocumentStore::JsonDir(d) => JsonDirStore::read_json(&d.progress_path(user_id)?).await,
    }
  }

  #[instrument(level = "debug", skip(self, doc), fields(user_id = %doc.user_id))]
  pub async fn save_progress(&self, doc: &UserProgress) -> Result<(), StoreError> {
    match self {
      DocumentStore::Memory(m) => {
        m.progress.write().await.insert(doc.user_id.clone(), doc.clone());
        Ok(())
      }
      DocumentStore::JsonDir(d) => JsonDirStore::write_json(&d.progress_path(&doc.user_id)?, doc).await,
    }
  }

  /// Every stored progress document. Unreadable files are skipped with a warning.
  #[instrument(level = "debug", skip(self))]
  pub async fn all_progress(&self) -> Result<Vec<UserProgress>, StoreError> {
    match self {
      DocumentStore::Memory(m) => {
        let mut docs: Vec<UserProgress> = m.progress.read().await.values().cloned().collect();
        docs.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(docs)
      }
      DocumentStore::JsonDir(d) => {
        let dir = d.root.join("progress");
        let mut entries = match tokio::fs::read_dir(&dir).await {
          Ok(rd) => rd,
          Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
          Err(e) => return Err(e.into()),
        };
        let mut docs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
          let path = entry.path();
          if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
          }
          match JsonDirStore::read_json::<UserProgress>(&path).await {
            Ok(Some(doc)) => docs.push(doc),
            Ok(None) => {}
            Err(e) => warn!(target: "trainer", path = %path.display(), error = %e, "Skipping unreadable progress document"),
          }
        }
        docs.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        debug!(target: "trainer", count = docs.len(), "Loaded progress documents");
        Ok(docs)
      }
    }
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn load_training(
    &self,
    user_id: &str,
    category: TrainingCategory,
  ) -> Result<Option<StoredTrainingRecords>, StoreError> {
    match self {
      DocumentStore::Memory(m) => Ok(m.training.read().await.get(&(user_id.to_string(), category)).cloned()),
      DocumentStore::JsonDir(d) => JsonDirStore::read_json(&d.training_path(user_id, category)?).await,
    }
  }

  #[instrument(level = "debug", skip(self, doc))]
  pub async fn save_training(
    &self,
    user_id: &str,
    category: TrainingCategory,
    doc: &StoredTrainingRecords,
  ) -> Result<(), StoreError> {
    match self {
      DocumentStore::Memory(m) => {
        m.training.write().await.insert((user_id.to_string(), category), doc.clone());
        Ok(())
      }
      DocumentStore::JsonDir(d) => JsonDirStore::write_json(&d.training_path(user_id, category)?, doc).await,
    }
  }
}
