use crate::error::RecordError;
use crate::records::{PlaylistFilter, PlaylistPatch, RecordResult, RecordStore, Tables};
use async_trait::async_trait;
use playlist_share_core::{PlaylistId, PlaylistMetadata, TrackEntry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Process-local record store. `set_offline` and `set_reject_writes` let
/// callers simulate transport failures and refused writes.
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: Mutex<Tables>,
    offline: AtomicBool,
    reject_writes: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn read(&self) -> RecordResult<MutexGuard<'_, Tables>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RecordError::Unavailable("store offline".to_string()));
        }
        self.tables
            .lock()
            .map_err(|_| RecordError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> RecordResult<MutexGuard<'_, Tables>> {
        let guard = self.read()?;
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(RecordError::Rejected("writes disabled".to_string()));
        }
        Ok(guard)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_playlist(&self, id: &PlaylistId) -> RecordResult<Option<PlaylistMetadata>> {
        Ok(self.read()?.playlist(id))
    }

    async fn fetch_entries(&self, id: &PlaylistId) -> RecordResult<Vec<TrackEntry>> {
        Ok(self.read()?.entries_of(id))
    }

    async fn insert_playlist(&self, playlist: PlaylistMetadata) -> RecordResult<PlaylistMetadata> {
        self.write()?.insert_playlist(playlist)
    }

    async fn update_playlist(
        &self,
        id: &PlaylistId,
        patch: PlaylistPatch,
    ) -> RecordResult<Option<PlaylistMetadata>> {
        Ok(self.write()?.update_playlist(id, patch))
    }

    async fn insert_entry(&self, entry: TrackEntry) -> RecordResult<TrackEntry> {
        self.write()?.insert_entry(entry)
    }

    async fn list_playlists(&self, filter: PlaylistFilter) -> RecordResult<Vec<PlaylistMetadata>> {
        Ok(self.read()?.list(&filter))
    }
}
