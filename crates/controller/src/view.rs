use playlist_share_core::{CandidateTrack, PlaylistMetadata, SortKind, TrackEntry};
use playlist_share_engine::PlaybackCursor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub entry_id: String,
    pub title: String,
    pub artist: String,
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub retryable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    /// Blank term: nothing requested, nothing to show.
    #[default]
    Idle,
    Loading,
    Results(Vec<CandidateTrack>),
    Failed(Notice),
}

impl SearchStatus {
    /// True only for a successful response with zero hits.
    pub fn is_no_results(&self) -> bool {
        matches!(self, SearchStatus::Results(r) if r.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchView {
    #[default]
    Closed,
    Open {
        term: String,
        status: SearchStatus,
    },
}

/// Snapshot published to every subscriber after each change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistView {
    pub metadata: PlaylistMetadata,
    /// Displayed order: the active sort, plus anything added since at the tail.
    pub tracks: Vec<TrackEntry>,
    pub sort: SortKind,
    pub cursor: PlaybackCursor,
    pub now_playing: Option<NowPlaying>,
    pub search: SearchView,
    pub notice: Option<Notice>,
}
