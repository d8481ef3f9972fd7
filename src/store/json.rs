//! JSON-file backed document store.
//!
//! All collections are held in memory behind an async `RwLock`. When the
//! store has a backing file, the in-memory copy is only a cache: every
//! operation takes an advisory lock on `<data file>.lock` and reloads the
//! document first, shared for reads and exclusive for writes. Mutations then
//! rewrite the whole document atomically (a temp file in the same directory
//! is written, synced and renamed over the original) before the lock is
//! released. Separate processes working on the same file therefore never
//! overwrite each other's changes.

use super::{FacilityStore, ReviewStore, TagStore};
use crate::error::StoreError;
use crate::models::{AccessTag, Facility, FacilitySummary, NewReview, Review, ReviewId};
use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// On-disk document layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Collections {
    #[serde(default)]
    facilities: BTreeMap<String, Facility>,
    #[serde(default)]
    reviews: Vec<Review>,
    #[serde(default)]
    access_tags: Vec<AccessTag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Held advisory lock. Dropping it releases the lock.
struct FileLock(File);

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Block until the lock next to `path` is held in `mode`.
fn acquire_lock(path: &Path, mode: LockMode) -> Result<FileLock, StoreError> {
    std::fs::create_dir_all(parent_dir(path))?;
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path(path))?;

    match mode {
        LockMode::Shared => FileExt::lock_shared(&file)?,
        LockMode::Exclusive => FileExt::lock_exclusive(&file)?,
    }
    Ok(FileLock(file))
}

/// Read the document at `path`, or `None` if there is no file yet.
fn load(path: &Path) -> Result<Option<Collections>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Document store persisted as a single JSON file.
pub struct JsonStore {
    path: Option<PathBuf>,
    data: RwLock<Collections>,
}

impl JsonStore {
    /// Store without a backing file.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: RwLock::new(Collections::default()),
        }
    }

    /// Open the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let data = if path.exists() {
            let _lock = acquire_lock(&path, LockMode::Shared)?;
            let data = load(&path)?.unwrap_or_default();
            info!(
                "Loaded store {} ({} facilities, {} reviews)",
                path.display(),
                data.facilities.len(),
                data.reviews.len()
            );
            data
        } else {
            debug!("Store file {} not found, starting empty", path.display());
            Collections::default()
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Take the file lock and refresh `data` from disk.
    ///
    /// Reads against a file that does not exist yet skip the lock.
    async fn sync(
        &self,
        data: &mut Collections,
        mode: LockMode,
    ) -> Result<Option<FileLock>, StoreError> {
        let Some(ref path) = self.path else {
            return Ok(None);
        };
        if mode == LockMode::Shared && !path.exists() {
            return Ok(None);
        }

        let lock_target = path.clone();
        let lock = tokio::task::spawn_blocking(move || acquire_lock(&lock_target, mode))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))??;

        if let Some(fresh) = load(path)? {
            *data = fresh;
        }
        Ok(Some(lock))
    }

    fn persist(&self, data: &Collections) -> Result<(), StoreError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        let dir = parent_dir(path);
        std::fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, data)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;

        debug!("Persisted store to {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for JsonStore {
    async fn create_review(&self, review: NewReview) -> Result<ReviewId, StoreError> {
        let mut data = self.data.write().await;
        let _lock = self.sync(&mut data, LockMode::Exclusive).await?;

        let id = uuid::Uuid::new_v4().to_string();
        data.reviews.push(review.into_review(id.clone(), Utc::now()));

        if let Err(e) = self.persist(&data) {
            data.reviews.pop();
            return Err(e);
        }

        Ok(id)
    }

    async fn find_reviews_by_facility(&self, facility_id: &str) -> Result<Vec<Review>, StoreError> {
        let mut data = self.data.write().await;
        let _lock = self.sync(&mut data, LockMode::Shared).await?;
        Ok(data
            .reviews
            .iter()
            .filter(|r| r.facility_id == facility_id)
            .cloned()
            .collect())
    }

    async fn all_reviews(&self) -> Result<Vec<Review>, StoreError> {
        let mut data = self.data.write().await;
        let _lock = self.sync(&mut data, LockMode::Shared).await?;
        Ok(data.reviews.clone())
    }
}

#[async_trait]
impl FacilityStore for JsonStore {
    async fn get_facility(&self, facility_id: &str) -> Result<Option<Facility>, StoreError> {
        let mut data = self.data.write().await;
        let _lock = self.sync(&mut data, LockMode::Shared).await?;
        Ok(data.facilities.get(facility_id).cloned())
    }

    async fn create_facility(&self, mut facility: Facility) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        let _lock = self.sync(&mut data, LockMode::Exclusive).await?;

        if data.facilities.contains_key(&facility.id) {
            return Err(StoreError::AlreadyExists {
                kind: "facility",
                id: facility.id,
            });
        }

        facility.summary = FacilitySummary::default();
        facility.revision = 0;
        let id = facility.id.clone();
        data.facilities.insert(id.clone(), facility);

        if let Err(e) = self.persist(&data) {
            data.facilities.remove(&id);
            return Err(e);
        }

        Ok(())
    }

    async fn update_facility_summary(
        &self,
        facility_id: &str,
        summary: FacilitySummary,
        expected_revision: u64,
    ) -> Result<u64, StoreError> {
        let mut data = self.data.write().await;
        let _lock = self.sync(&mut data, LockMode::Exclusive).await?;

        let facility = data
            .facilities
            .get_mut(facility_id)
            .ok_or_else(|| StoreError::facility_not_found(facility_id))?;

        if facility.revision != expected_revision {
            return Err(StoreError::RevisionConflict {
                id: facility_id.to_string(),
                expected: expected_revision,
                actual: facility.revision,
            });
        }

        let previous = std::mem::replace(&mut facility.summary, summary);
        facility.revision += 1;
        let revision = facility.revision;

        if let Err(e) = self.persist(&data) {
            if let Some(facility) = data.facilities.get_mut(facility_id) {
                facility.summary = previous;
                facility.revision -= 1;
            }
            return Err(e);
        }

        Ok(revision)
    }

    async fn list_facilities(&self) -> Result<Vec<Facility>, StoreError> {
        let mut data = self.data.write().await;
        let _lock = self.sync(&mut data, LockMode::Shared).await?;
        Ok(data.facilities.values().cloned().collect())
    }
}

#[async_trait]
impl TagStore for JsonStore {
    async fn list_access_tags(&self) -> Result<Vec<AccessTag>, StoreError> {
        let mut data = self.data.write().await;
        let _lock = self.sync(&mut data, LockMode::Shared).await?;
        Ok(data.access_tags.clone())
    }

    async fn add_access_tag(&self, tag: AccessTag) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        let _lock = self.sync(&mut data, LockMode::Exclusive).await?;

        if data.access_tags.iter().any(|t| t.id == tag.id) {
            return Err(StoreError::AlreadyExists {
                kind: "access tag",
                id: tag.id,
            });
        }

        data.access_tags.push(tag);

        if let Err(e) = self.persist(&data) {
            data.access_tags.pop();
            return Err(e);
        }

        Ok(())
    }
}
