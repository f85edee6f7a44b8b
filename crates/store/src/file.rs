use crate::error::RecordError;
use crate::records::{PlaylistFilter, PlaylistPatch, RecordResult, RecordStore, Tables};
use async_trait::async_trait;
use playlist_share_core::{PlaylistId, PlaylistMetadata, TrackEntry};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Whole-file JSON store. Every write rewrites the file through a temp file
/// and rename, so a failed write leaves the previous contents in place.
pub struct JsonFileRecordStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> RecordResult<Tables> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                RecordError::Unavailable(format!("corrupt {}: {e}", self.path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Tables::default()),
            Err(err) => Err(RecordError::Unavailable(format!(
                "failed to read {}: {err}",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, tables: &Tables) -> RecordResult<()> {
        let bytes = serde_json::to_vec_pretty(tables)
            .map_err(|e| RecordError::Rejected(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RecordError::Unavailable(e.to_string()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| RecordError::Unavailable(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| RecordError::Unavailable(e.to_string()))?;
        debug!(path = %self.path.display(), "store file written");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn fetch_playlist(&self, id: &PlaylistId) -> RecordResult<Option<PlaylistMetadata>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.playlist(id))
    }

    async fn fetch_entries(&self, id: &PlaylistId) -> RecordResult<Vec<TrackEntry>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.entries_of(id))
    }

    async fn insert_playlist(&self, playlist: PlaylistMetadata) -> RecordResult<PlaylistMetadata> {
        let _guard = self.lock.lock().await;
        let mut tables = self.load().await?;
        let saved = tables.insert_playlist(playlist)?;
        self.save(&tables).await?;
        Ok(saved)
    }

    async fn update_playlist(
        &self,
        id: &PlaylistId,
        patch: PlaylistPatch,
    ) -> RecordResult<Option<PlaylistMetadata>> {
        let _guard = self.lock.lock().await;
        let mut tables = self.load().await?;
        let updated = tables.update_playlist(id, patch);
        if updated.is_some() {
            self.save(&tables).await?;
        }
        Ok(updated)
    }

    async fn insert_entry(&self, entry: TrackEntry) -> RecordResult<TrackEntry> {
        let _guard = self.lock.lock().await;
        let mut tables = self.load().await?;
        let saved = tables.insert_entry(entry)?;
        self.save(&tables).await?;
        Ok(saved)
    }

    async fn list_playlists(&self, filter: PlaylistFilter) -> RecordResult<Vec<PlaylistMetadata>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.list(&filter))
    }
}
