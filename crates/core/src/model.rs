use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(pub String);

impl PlaylistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to a short playable clip. Only its presence matters to
/// the core; the audio collaborator knows how to resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewHandle(pub String);

impl PreviewHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(format!("unknown visibility '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistMetadata {
    pub id: PlaylistId,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub visibility: Visibility,
    pub created_at: SystemTime,
}

impl PlaylistMetadata {
    /// Trims a proposed title and rejects it if nothing is left.
    pub fn validate_title(title: &str) -> Result<String, ValidationError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(trimmed.to_string())
    }
}

/// A track as returned by the catalog. Not persisted until added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateTrack {
    pub catalog_id: String,
    pub title: String,
    pub artist: String,
    pub cover_url: Option<String>,
    pub preview: Option<PreviewHandle>,
    pub duration_ms: Option<u64>,
}

impl CandidateTrack {
    pub fn is_playable(&self) -> bool {
        self.preview.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackEntry {
    pub id: String,
    pub playlist_id: PlaylistId,
    pub title: String,
    pub artist: String,
    pub cover_url: Option<String>,
    pub preview: Option<PreviewHandle>,
    pub duration_ms: Option<u64>,
    /// Canonical ordering key. Unique per playlist, not necessarily contiguous.
    pub position: i64,
    pub added_at: SystemTime,
}

impl TrackEntry {
    pub fn is_playable(&self) -> bool {
        self.preview.is_some()
    }

    /// `m:ss`, or `--:--` when the catalog did not report a duration.
    pub fn duration_label(&self) -> String {
        match self.duration_ms {
            Some(ms) => {
                let minutes = ms / 60_000;
                let seconds = (ms % 60_000) / 1_000;
                format!("{minutes}:{seconds:02}")
            }
            None => "--:--".to_string(),
        }
    }
}

/// Metadata plus entries in ascending `position` order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderedPlaylist {
    pub metadata: PlaylistMetadata,
    pub entries: Vec<TrackEntry>,
}

impl OrderedPlaylist {
    pub fn new(metadata: PlaylistMetadata, mut entries: Vec<TrackEntry>) -> Self {
        entries.sort_by_key(|e| e.position);
        Self { metadata, entries }
    }

    pub fn next_position(&self) -> i64 {
        next_position(&self.entries)
    }
}

/// `max(position) + 1`, or `1` for an empty playlist.
pub fn next_position(entries: &[TrackEntry]) -> i64 {
    entries
        .iter()
        .map(|e| e.position)
        .max()
        .map(|max| max + 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn entry(position: i64) -> TrackEntry {
        TrackEntry {
            id: format!("e{position}"),
            playlist_id: PlaylistId::new("p1"),
            title: "Title".to_string(),
            artist: "Artist".to_string(),
            cover_url: None,
            preview: None,
            duration_ms: None,
            position,
            added_at: UNIX_EPOCH,
        }
    }

    #[test]
    fn next_position_starts_at_one_and_skips_gaps() {
        assert_eq!(next_position(&[]), 1);
        assert_eq!(next_position(&[entry(1), entry(7), entry(3)]), 8);
    }

    #[test]
    fn title_validation_trims() {
        assert_eq!(
            PlaylistMetadata::validate_title("  Road Trip "),
            Ok("Road Trip".to_string())
        );
        assert_eq!(
            PlaylistMetadata::validate_title("   "),
            Err(ValidationError::EmptyTitle)
        );
    }

    #[test]
    fn duration_label_formats_minutes_and_seconds() {
        let mut e = entry(1);
        assert_eq!(e.duration_label(), "--:--");
        e.duration_ms = Some(222_000);
        assert_eq!(e.duration_label(), "3:42");
        e.duration_ms = Some(65_400);
        assert_eq!(e.duration_label(), "1:05");
    }

    #[test]
    fn visibility_parses_case_insensitively() {
        assert_eq!("Private".parse::<Visibility>(), Ok(Visibility::Private));
        assert!("hidden".parse::<Visibility>().is_err());
    }
}
