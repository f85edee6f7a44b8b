use playlist_share_core::{
    model::next_position, CandidateTrack, OrderedPlaylist, PlaylistId, PlaylistMetadata,
    TrackEntry, Visibility,
};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

mod error;
mod file;
mod memory;
mod records;

pub use error::{RecordError, Result, StoreError};
pub use file::JsonFileRecordStore;
pub use memory::MemoryRecordStore;
pub use records::{PlaylistFilter, PlaylistPatch, RecordResult, RecordStore};

pub type Clock = Arc<dyn Fn() -> SystemTime + Send + Sync>;

/// Validated commands over one record store. Nothing here caches: every
/// call reflects what the backend acknowledged.
#[derive(Clone)]
pub struct PlaylistStore {
    records: Arc<dyn RecordStore>,
    clock: Clock,
}

impl PlaylistStore {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self::with_clock(records, Arc::new(SystemTime::now))
    }

    pub fn with_clock(records: Arc<dyn RecordStore>, clock: Clock) -> Self {
        Self { records, clock }
    }

    pub async fn load(&self, id: &PlaylistId) -> Result<OrderedPlaylist> {
        let metadata = self
            .records
            .fetch_playlist(id)
            .await
            .map_err(StoreError::on_read)?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let entries = self
            .records
            .fetch_entries(id)
            .await
            .map_err(StoreError::on_read)?;

        debug!(playlist_id = %id, entries = entries.len(), "playlist loaded");
        Ok(OrderedPlaylist::new(metadata, entries))
    }

    /// Persists `candidate` at `max(position) + 1`. Assumes a single writer
    /// per playlist: two clients appending at once can pick the same
    /// position, and the backend's uniqueness check rejects the loser.
    pub async fn append(&self, id: &PlaylistId, candidate: &CandidateTrack) -> Result<TrackEntry> {
        let existing = self
            .records
            .fetch_entries(id)
            .await
            .map_err(StoreError::on_write)?;
        let position = next_position(&existing);

        let entry = TrackEntry {
            id: uuid::Uuid::new_v4().to_string(),
            playlist_id: id.clone(),
            title: candidate.title.clone(),
            artist: candidate.artist.clone(),
            cover_url: candidate.cover_url.clone(),
            preview: candidate.preview.clone(),
            duration_ms: candidate.duration_ms,
            position,
            added_at: (self.clock)(),
        };

        let saved = self.records.insert_entry(entry).await.map_err(|err| {
            warn!(playlist_id = %id, position, error = %err, "append rejected");
            StoreError::on_write(err)
        })?;

        info!(playlist_id = %id, position, title = %saved.title, "track appended");
        Ok(saved)
    }

    /// Last write wins; there is no version check between concurrent renames.
    pub async fn rename(&self, id: &PlaylistId, new_title: &str) -> Result<PlaylistMetadata> {
        let title = PlaylistMetadata::validate_title(new_title)?;
        let patch = PlaylistPatch {
            title: Some(title),
            ..PlaylistPatch::default()
        };
        let updated = self.patch(id, patch).await?;
        info!(playlist_id = %id, title = %updated.title, "playlist renamed");
        Ok(updated)
    }

    pub async fn set_visibility(
        &self,
        id: &PlaylistId,
        visibility: Visibility,
    ) -> Result<PlaylistMetadata> {
        let patch = PlaylistPatch {
            visibility: Some(visibility),
            ..PlaylistPatch::default()
        };
        let updated = self.patch(id, patch).await?;
        info!(playlist_id = %id, ?visibility, "playlist visibility changed");
        Ok(updated)
    }

    pub async fn create(
        &self,
        owner_id: &str,
        title: &str,
        description: Option<&str>,
        visibility: Visibility,
    ) -> Result<PlaylistMetadata> {
        let title = PlaylistMetadata::validate_title(title)?;
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let playlist = PlaylistMetadata {
            id: PlaylistId::new(uuid::Uuid::new_v4().to_string()),
            title,
            description,
            owner_id: owner_id.to_string(),
            visibility,
            created_at: (self.clock)(),
        };

        let saved = self
            .records
            .insert_playlist(playlist)
            .await
            .map_err(StoreError::on_write)?;
        info!(playlist_id = %saved.id, owner_id, "playlist created");
        Ok(saved)
    }

    pub async fn list_owned(&self, owner_id: &str) -> Result<Vec<PlaylistMetadata>> {
        self.records
            .list_playlists(PlaylistFilter::OwnedBy(owner_id.to_string()))
            .await
            .map_err(StoreError::on_read)
    }

    pub async fn list_public(&self) -> Result<Vec<PlaylistMetadata>> {
        self.records
            .list_playlists(PlaylistFilter::Public)
            .await
            .map_err(StoreError::on_read)
    }

    async fn patch(&self, id: &PlaylistId, patch: PlaylistPatch) -> Result<PlaylistMetadata> {
        self.records
            .update_playlist(id, patch)
            .await
            .map_err(StoreError::on_write)?
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}
