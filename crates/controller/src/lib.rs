//! One owned controller per open playlist.
//!
//! UI surfaces send intents through [`PlaylistController`] and read the
//! [`PlaylistView`] it publishes; none of them keep their own copy of the
//! track list or of what is playing.

use playlist_share_catalog::TrackCatalogClient;
use playlist_share_core::{
    materialize, CandidateTrack, OrderedPlaylist, PlaylistId, PlaylistMetadata, SortKind,
    TrackEntry, Visibility,
};
use playlist_share_engine::{AudioOutput, PlaybackSequencer, Transition};
use playlist_share_store::PlaylistStore;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

mod error;
mod view;

pub use error::ControllerError;
pub use view::{Notice, NowPlaying, PlaylistView, SearchStatus, SearchView};

pub type Result<T> = std::result::Result<T, ControllerError>;

/// Identifies one search request. Only the newest ticket issued while the
/// panel is open may apply its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    term: String,
}

impl SearchTicket {
    pub fn term(&self) -> &str {
        &self.term
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Applied,
    Discarded,
}

pub struct PlaylistController {
    store: PlaylistStore,
    catalog: Arc<dyn TrackCatalogClient>,
    audio: Box<dyn AudioOutput>,
    sequencer: PlaybackSequencer,
    playlist: OrderedPlaylist,
    sort: SortKind,
    displayed: Vec<TrackEntry>,
    search: SearchView,
    search_generation: u64,
    notice: Option<Notice>,
    publisher: watch::Sender<PlaylistView>,
}

impl PlaylistController {
    pub async fn open(
        id: &PlaylistId,
        store: PlaylistStore,
        catalog: Arc<dyn TrackCatalogClient>,
        audio: Box<dyn AudioOutput>,
    ) -> Result<Self> {
        let playlist = store.load(id).await.map_err(|err| {
            warn!(playlist_id = %id, error = %err, "failed to open playlist");
            ControllerError::from(err)
        })?;
        let displayed = playlist.entries.clone();
        let sequencer = PlaybackSequencer::new();

        let initial = PlaylistView {
            metadata: playlist.metadata.clone(),
            tracks: displayed.clone(),
            sort: SortKind::Position,
            cursor: sequencer.cursor(),
            now_playing: None,
            search: SearchView::Closed,
            notice: None,
        };
        let (publisher, _) = watch::channel(initial);

        info!(playlist_id = %id, tracks = displayed.len(), "playlist opened");
        Ok(Self {
            store,
            catalog,
            audio,
            sequencer,
            playlist,
            sort: SortKind::Position,
            displayed,
            search: SearchView::Closed,
            search_generation: 0,
            notice: None,
            publisher,
        })
    }

    pub fn id(&self) -> &PlaylistId {
        &self.playlist.metadata.id
    }

    pub fn metadata(&self) -> &PlaylistMetadata {
        &self.playlist.metadata
    }

    /// Entries in the order currently displayed.
    pub fn tracks(&self) -> &[TrackEntry] {
        &self.displayed
    }

    /// Entries in canonical `position` order.
    pub fn canonical(&self) -> &[TrackEntry] {
        &self.playlist.entries
    }

    pub fn sequencer(&self) -> &PlaybackSequencer {
        &self.sequencer
    }

    /// Shared handle for callers that want to run a search outside the
    /// controller borrow and hand the result to [`Self::complete_search`].
    pub fn catalog(&self) -> Arc<dyn TrackCatalogClient> {
        self.catalog.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaylistView> {
        self.publisher.subscribe()
    }

    pub fn view(&self) -> PlaylistView {
        self.publisher.borrow().clone()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
        self.publish();
    }

    // ---------------- search ----------------

    pub fn open_search(&mut self) {
        if matches!(self.search, SearchView::Closed) {
            self.search = SearchView::Open {
                term: String::new(),
                status: SearchStatus::Idle,
            };
            self.publish();
        }
    }

    /// Closing invalidates any request still in flight.
    pub fn close_search(&mut self) {
        self.search_generation += 1;
        self.search = SearchView::Closed;
        self.publish();
    }

    pub fn begin_search(&mut self, term: &str) -> SearchTicket {
        self.search_generation += 1;
        let status = if term.trim().is_empty() {
            SearchStatus::Idle
        } else {
            SearchStatus::Loading
        };
        self.search = SearchView::Open {
            term: term.to_string(),
            status,
        };
        self.publish();

        SearchTicket {
            generation: self.search_generation,
            term: term.to_string(),
        }
    }

    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        result: std::result::Result<Vec<CandidateTrack>, playlist_share_catalog::CatalogError>,
    ) -> SearchOutcome {
        let current = match &self.search {
            SearchView::Open { term, .. } => {
                ticket.generation == self.search_generation && *term == ticket.term
            }
            SearchView::Closed => false,
        };
        if !current {
            debug!(term = %ticket.term, "discarding stale search response");
            return SearchOutcome::Discarded;
        }

        let status = if ticket.term.trim().is_empty() {
            SearchStatus::Idle
        } else {
            match result {
                Ok(tracks) => SearchStatus::Results(tracks),
                Err(err) => {
                    let err = ControllerError::from(err);
                    warn!(term = %ticket.term, error = %err, "search failed");
                    SearchStatus::Failed(notice_for(&err))
                }
            }
        };
        self.search = SearchView::Open {
            term: ticket.term,
            status,
        };
        self.publish();
        SearchOutcome::Applied
    }

    /// `begin_search`, one catalog call, `complete_search`. Blank terms
    /// never reach the catalog.
    pub async fn search(&mut self, term: &str) -> SearchOutcome {
        let ticket = self.begin_search(term);
        let result = if ticket.term().trim().is_empty() {
            Ok(Vec::new())
        } else {
            self.catalog.search(ticket.term()).await
        };
        self.complete_search(ticket, result)
    }

    // ---------------- edits ----------------

    /// Persists `candidate` and appends it to the tail of both the canonical
    /// and the displayed sequence. Local state changes only after the store
    /// acknowledges the write.
    pub async fn add_from_search(&mut self, candidate: &CandidateTrack) -> Result<TrackEntry> {
        let id = self.playlist.metadata.id.clone();
        let entry = match self.store.append(&id, candidate).await {
            Ok(entry) => entry,
            Err(err) => return Err(self.fail(err.into())),
        };

        self.playlist.entries.push(entry.clone());
        self.displayed.push(entry.clone());
        self.notice = None;
        self.publish();
        Ok(entry)
    }

    pub async fn rename(&mut self, title: &str) -> Result<PlaylistMetadata> {
        let id = self.playlist.metadata.id.clone();
        let updated = match self.store.rename(&id, title).await {
            Ok(meta) => meta,
            Err(err) => return Err(self.fail(err.into())),
        };
        self.playlist.metadata = updated.clone();
        self.notice = None;
        self.publish();
        Ok(updated)
    }

    pub async fn set_visibility(&mut self, visibility: Visibility) -> Result<PlaylistMetadata> {
        let id = self.playlist.metadata.id.clone();
        let updated = match self.store.set_visibility(&id, visibility).await {
            Ok(meta) => meta,
            Err(err) => return Err(self.fail(err.into())),
        };
        self.playlist.metadata = updated.clone();
        self.notice = None;
        self.publish();
        Ok(updated)
    }

    /// Re-materializes the displayed order. Stored positions are untouched;
    /// `SortKind::Position` gives back the canonical order exactly.
    pub fn apply_sort(&mut self, kind: SortKind) {
        self.sort = kind;
        self.displayed = materialize(&self.playlist.entries, kind);
        self.sequencer.reindex(&self.displayed);
        debug!(?kind, "sort applied");
        self.publish();
    }

    // ---------------- playback ----------------

    /// Walks the displayed order, which may be a sort view.
    pub fn play_all(&mut self) -> Result<Transition> {
        let outcome = self.sequencer.play_all(&self.displayed, self.audio.as_mut());
        self.after_playback(outcome)
    }

    pub fn play_at(&mut self, index: usize) -> Result<Transition> {
        let outcome = self
            .sequencer
            .play_at(&self.displayed, index, self.audio.as_mut());
        self.after_playback(outcome)
    }

    /// Called by the audio host when the current preview ends. `index` is
    /// the cursor index from the latest view, which follows re-sorts.
    pub fn on_preview_ended(&mut self, index: usize) -> Result<Transition> {
        let outcome = self
            .sequencer
            .on_preview_ended(&self.displayed, index, self.audio.as_mut());
        self.after_playback(outcome)
    }

    pub fn stop(&mut self) -> Transition {
        let transition = self.sequencer.stop(self.audio.as_mut());
        self.publish();
        transition
    }

    fn after_playback(
        &mut self,
        outcome: playlist_share_engine::Result<Transition>,
    ) -> Result<Transition> {
        match outcome {
            Ok(Transition::NothingToPlay) => {
                self.notice = Some(Notice {
                    message: "Nothing to play: no track in this playlist has a preview."
                        .to_string(),
                    retryable: false,
                });
                self.publish();
                Ok(Transition::NothingToPlay)
            }
            Ok(transition) => {
                self.publish();
                Ok(transition)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    fn fail(&mut self, err: ControllerError) -> ControllerError {
        warn!(playlist_id = %self.playlist.metadata.id, error = %err, "operation failed");
        self.notice = Some(notice_for(&err));
        self.publish();
        err
    }

    fn now_playing(&self) -> Option<NowPlaying> {
        let entry_id = self.sequencer.playing_entry_id()?;
        self.playlist
            .entries
            .iter()
            .find(|e| e.id == entry_id)
            .map(|e| NowPlaying {
                entry_id: e.id.clone(),
                title: e.title.clone(),
                artist: e.artist.clone(),
                cover_url: e.cover_url.clone(),
            })
    }

    fn publish(&self) {
        let view = PlaylistView {
            metadata: self.playlist.metadata.clone(),
            tracks: self.displayed.clone(),
            sort: self.sort,
            cursor: self.sequencer.cursor(),
            now_playing: self.now_playing(),
            search: self.search.clone(),
            notice: self.notice.clone(),
        };
        self.publisher.send_replace(view);
    }
}

fn notice_for(err: &ControllerError) -> Notice {
    Notice {
        message: err.user_message(),
        retryable: err.is_retryable(),
    }
}
