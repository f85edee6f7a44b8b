use crate::error::RecordError;
use async_trait::async_trait;
use playlist_share_core::{PlaylistId, PlaylistMetadata, TrackEntry, Visibility};
use serde::{Deserialize, Serialize};

pub type RecordResult<T> = std::result::Result<T, RecordError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistPatch {
    pub title: Option<String>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistFilter {
    OwnedBy(String),
    Public,
}

/// Keyed playlist and entry records. Implementations only store and order;
/// validation and position assignment live in [`crate::PlaylistStore`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_playlist(&self, id: &PlaylistId) -> RecordResult<Option<PlaylistMetadata>>;

    /// Entries of one playlist ordered by `position` ascending.
    async fn fetch_entries(&self, id: &PlaylistId) -> RecordResult<Vec<TrackEntry>>;

    async fn insert_playlist(&self, playlist: PlaylistMetadata) -> RecordResult<PlaylistMetadata>;

    /// Returns `None` when no playlist has that id.
    async fn update_playlist(
        &self,
        id: &PlaylistId,
        patch: PlaylistPatch,
    ) -> RecordResult<Option<PlaylistMetadata>>;

    /// Must reject entries for unknown playlists and duplicate positions.
    async fn insert_entry(&self, entry: TrackEntry) -> RecordResult<TrackEntry>;

    /// Newest first.
    async fn list_playlists(&self, filter: PlaylistFilter) -> RecordResult<Vec<PlaylistMetadata>>;
}

/// Plain tables shared by the memory and file backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    pub playlists: Vec<PlaylistMetadata>,
    #[serde(default)]
    pub entries: Vec<TrackEntry>,
}

impl Tables {
    pub fn playlist(&self, id: &PlaylistId) -> Option<PlaylistMetadata> {
        self.playlists.iter().find(|p| &p.id == id).cloned()
    }

    pub fn entries_of(&self, id: &PlaylistId) -> Vec<TrackEntry> {
        let mut out: Vec<TrackEntry> = self
            .entries
            .iter()
            .filter(|e| &e.playlist_id == id)
            .cloned()
            .collect();
        out.sort_by_key(|e| e.position);
        out
    }

    pub fn insert_playlist(&mut self, playlist: PlaylistMetadata) -> RecordResult<PlaylistMetadata> {
        if self.playlists.iter().any(|p| p.id == playlist.id) {
            return Err(RecordError::Rejected(format!(
                "playlist {} already exists",
                playlist.id
            )));
        }
        self.playlists.push(playlist.clone());
        Ok(playlist)
    }

    pub fn update_playlist(
        &mut self,
        id: &PlaylistId,
        patch: PlaylistPatch,
    ) -> Option<PlaylistMetadata> {
        let row = self.playlists.iter_mut().find(|p| &p.id == id)?;
        if let Some(title) = patch.title {
            row.title = title;
        }
        if let Some(visibility) = patch.visibility {
            row.visibility = visibility;
        }
        Some(row.clone())
    }

    pub fn insert_entry(&mut self, entry: TrackEntry) -> RecordResult<TrackEntry> {
        if !self.playlists.iter().any(|p| p.id == entry.playlist_id) {
            return Err(RecordError::Rejected(format!(
                "playlist {} does not exist",
                entry.playlist_id
            )));
        }
        if self
            .entries
            .iter()
            .any(|e| e.playlist_id == entry.playlist_id && e.position == entry.position)
        {
            return Err(RecordError::Rejected(format!(
                "position {} already taken",
                entry.position
            )));
        }
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn list(&self, filter: &PlaylistFilter) -> Vec<PlaylistMetadata> {
        let mut out: Vec<PlaylistMetadata> = self
            .playlists
            .iter()
            .filter(|p| match filter {
                PlaylistFilter::OwnedBy(owner) => &p.owner_id == owner,
                PlaylistFilter::Public => p.visibility.is_public(),
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }
}
