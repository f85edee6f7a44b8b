//! Play-all sequencing over the displayed track order.
//!
//! The sequencer never blocks and owns no timers. It moves only when told
//! to: `play_all`/`play_at`/`stop` from the user, and `on_preview_ended`
//! from the audio collaborator. At most one preview is active at a time;
//! every path into `Playing` stops the previous preview first.

use playlist_share_core::{PreviewHandle, TrackEntry};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SequencerError {
    #[error("audio output failed to start preview: {0}")]
    Audio(String),
}

pub type Result<T> = std::result::Result<T, SequencerError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRequest {
    pub index: usize,
    pub entry_id: String,
    pub preview: PreviewHandle,
}

/// External audio playback. The end of a preview is reported through
/// [`PlaybackSequencer::on_preview_ended`] with the cursor's current index,
/// which differs from the request's index once the displayed order changes.
pub trait AudioOutput: Send {
    /// Starts `request.preview` from the beginning.
    fn start(&mut self, request: &PlayRequest) -> std::result::Result<(), String>;

    /// Halts whatever is playing. Must be safe to call when nothing is.
    fn stop(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SequencerState {
    #[default]
    Idle,
    Playing {
        index: usize,
        entry_id: String,
    },
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorState {
    #[default]
    Idle,
    Playing,
    Ended,
}

/// Process-local view of the sequencer, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackCursor {
    pub current_index: Option<usize>,
    pub state: CursorState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started { index: usize },
    Advanced { from: usize, to: usize },
    NothingToPlay,
    Ended,
    Stopped,
    /// Stale completion, unplayable target, or a stop with nothing playing.
    Unchanged,
}

#[derive(Debug, Default)]
pub struct PlaybackSequencer {
    state: SequencerState,
}

impl PlaybackSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn cursor(&self) -> PlaybackCursor {
        match &self.state {
            SequencerState::Idle => PlaybackCursor::default(),
            SequencerState::Playing { index, .. } => PlaybackCursor {
                current_index: Some(*index),
                state: CursorState::Playing,
            },
            SequencerState::Ended => PlaybackCursor {
                current_index: None,
                state: CursorState::Ended,
            },
        }
    }

    pub fn playing_entry_id(&self) -> Option<&str> {
        match &self.state {
            SequencerState::Playing { entry_id, .. } => Some(entry_id),
            _ => None,
        }
    }

    /// Follows the playing entry into a re-ordered `tracks`. If the entry is
    /// no longer displayed the cursor is left alone.
    pub fn reindex(&mut self, tracks: &[TrackEntry]) -> Option<usize> {
        let SequencerState::Playing { index, entry_id } = &mut self.state else {
            return None;
        };
        let Some(moved) = tracks.iter().position(|e| e.id == *entry_id) else {
            warn!(entry_id = %entry_id, "playing entry not in displayed order");
            return Some(*index);
        };
        if moved != *index {
            debug!(from = *index, to = moved, "playback cursor moved");
            *index = moved;
        }
        Some(moved)
    }

    /// Restarts from the top of `tracks`, whatever the current state.
    pub fn play_all(
        &mut self,
        tracks: &[TrackEntry],
        audio: &mut dyn AudioOutput,
    ) -> Result<Transition> {
        self.release(audio);
        self.state = SequencerState::Idle;

        match next_playable(tracks, 0) {
            Some(index) => {
                self.start(tracks, index, audio)?;
                Ok(Transition::Started { index })
            }
            None => {
                info!(tracks = tracks.len(), "play all: nothing to play");
                Ok(Transition::NothingToPlay)
            }
        }
    }

    /// Plays one entry, then keeps advancing like play-all. An out-of-range
    /// or unplayable index leaves everything as it was.
    pub fn play_at(
        &mut self,
        tracks: &[TrackEntry],
        index: usize,
        audio: &mut dyn AudioOutput,
    ) -> Result<Transition> {
        if !tracks.get(index).is_some_and(TrackEntry::is_playable) {
            debug!(index, "play_at: entry missing or has no preview");
            return Ok(Transition::Unchanged);
        }
        self.release(audio);
        self.start(tracks, index, audio)?;
        Ok(Transition::Started { index })
    }

    pub fn on_preview_ended(
        &mut self,
        tracks: &[TrackEntry],
        index: usize,
        audio: &mut dyn AudioOutput,
    ) -> Result<Transition> {
        match &self.state {
            SequencerState::Playing { index: current, .. } if *current == index => {}
            other => {
                debug!(index, state = ?other, "ignoring stale preview end");
                return Ok(Transition::Unchanged);
            }
        }

        self.release(audio);
        match next_playable(tracks, index + 1) {
            Some(next) => {
                self.start(tracks, next, audio)?;
                Ok(Transition::Advanced {
                    from: index,
                    to: next,
                })
            }
            None => {
                self.state = SequencerState::Ended;
                info!(last = index, "play all finished");
                Ok(Transition::Ended)
            }
        }
    }

    /// Idempotent. From `Ended` the sequencer stays `Ended`.
    pub fn stop(&mut self, audio: &mut dyn AudioOutput) -> Transition {
        if matches!(self.state, SequencerState::Playing { .. }) {
            self.release(audio);
            info!("playback stopped");
            Transition::Stopped
        } else {
            Transition::Unchanged
        }
    }

    fn release(&mut self, audio: &mut dyn AudioOutput) {
        if let SequencerState::Playing { index, .. } = self.state {
            debug!(index, "releasing active preview");
            audio.stop();
            self.state = SequencerState::Idle;
        }
    }

    // Caller has already released any active preview.
    fn start(
        &mut self,
        tracks: &[TrackEntry],
        index: usize,
        audio: &mut dyn AudioOutput,
    ) -> Result<()> {
        let entry = &tracks[index];
        let Some(preview) = entry.preview.clone() else {
            self.state = SequencerState::Idle;
            return Ok(());
        };
        let request = PlayRequest {
            index,
            entry_id: entry.id.clone(),
            preview,
        };

        if let Err(err) = audio.start(&request) {
            warn!(index, entry_id = %entry.id, error = %err, "preview failed to start");
            audio.stop();
            self.state = SequencerState::Idle;
            return Err(SequencerError::Audio(err));
        }

        debug!(index, entry_id = %entry.id, "preview started");
        self.state = SequencerState::Playing {
            index,
            entry_id: request.entry_id,
        };
        Ok(())
    }
}

fn next_playable(tracks: &[TrackEntry], from: usize) -> Option<usize> {
    tracks
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, e)| e.is_playable())
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlist_share_core::PlaylistId;
    use std::time::UNIX_EPOCH;

    #[derive(Default)]
    struct RecordingAudio {
        started: Vec<usize>,
        stops: usize,
        active: Option<usize>,
        fail_on: Option<usize>,
        overlaps: usize,
    }

    impl AudioOutput for RecordingAudio {
        fn start(&mut self, request: &PlayRequest) -> std::result::Result<(), String> {
            if self.fail_on == Some(request.index) {
                return Err("device busy".to_string());
            }
            if self.active.is_some() {
                self.overlaps += 1;
            }
            self.started.push(request.index);
            self.active = Some(request.index);
            Ok(())
        }

        fn stop(&mut self) {
            self.stops += 1;
            self.active = None;
        }
    }

    fn track(id: &str, playable: bool) -> TrackEntry {
        TrackEntry {
            id: id.to_string(),
            playlist_id: PlaylistId::new("p1"),
            title: id.to_string(),
            artist: "Artist".to_string(),
            cover_url: None,
            preview: playable.then(|| PreviewHandle::new(format!("https://audio/{id}"))),
            duration_ms: None,
            position: 0,
            added_at: UNIX_EPOCH,
        }
    }

    fn mixed() -> Vec<TrackEntry> {
        vec![
            track("A", false),
            track("B", true),
            track("C", false),
            track("D", true),
        ]
    }

    #[test]
    fn play_all_skips_unplayable_and_ends() {
        let tracks = mixed();
        let mut audio = RecordingAudio::default();
        let mut seq = PlaybackSequencer::new();

        assert_eq!(
            seq.play_all(&tracks, &mut audio).unwrap(),
            Transition::Started { index: 1 }
        );
        assert_eq!(seq.playing_entry_id(), Some("B"));

        assert_eq!(
            seq.on_preview_ended(&tracks, 1, &mut audio).unwrap(),
            Transition::Advanced { from: 1, to: 3 }
        );
        assert_eq!(seq.cursor().current_index, Some(3));

        assert_eq!(
            seq.on_preview_ended(&tracks, 3, &mut audio).unwrap(),
            Transition::Ended
        );
        assert_eq!(seq.state(), &SequencerState::Ended);
        assert_eq!(audio.started, vec![1, 3]);
        assert_eq!(audio.active, None);
    }

    #[test]
    fn nothing_playable_stays_idle() {
        let tracks = vec![track("A", false), track("B", false)];
        let mut audio = RecordingAudio::default();
        let mut seq = PlaybackSequencer::new();

        assert_eq!(
            seq.play_all(&tracks, &mut audio).unwrap(),
            Transition::NothingToPlay
        );
        assert_eq!(seq.state(), &SequencerState::Idle);
        assert!(audio.started.is_empty());

        assert_eq!(
            seq.play_all(&[], &mut audio).unwrap(),
            Transition::NothingToPlay
        );
    }

    #[test]
    fn stale_end_event_is_ignored() {
        let tracks = mixed();
        let mut audio = RecordingAudio::default();
        let mut seq = PlaybackSequencer::new();
        seq.play_all(&tracks, &mut audio).unwrap();
        seq.on_preview_ended(&tracks, 1, &mut audio).unwrap();

        let before = seq.state().clone();
        assert_eq!(
            seq.on_preview_ended(&tracks, 1, &mut audio).unwrap(),
            Transition::Unchanged
        );
        assert_eq!(seq.state(), &before);
        assert_eq!(audio.started, vec![1, 3]);
    }

    #[test]
    fn end_event_while_idle_is_ignored() {
        let tracks = mixed();
        let mut audio = RecordingAudio::default();
        let mut seq = PlaybackSequencer::new();
        assert_eq!(
            seq.on_preview_ended(&tracks, 1, &mut audio).unwrap(),
            Transition::Unchanged
        );
        assert_eq!(seq.state(), &SequencerState::Idle);
    }

    #[test]
    fn replay_restarts_from_top_and_stops_previous() {
        let tracks = mixed();
        let mut audio = RecordingAudio::default();
        let mut seq = PlaybackSequencer::new();
        seq.play_all(&tracks, &mut audio).unwrap();
        seq.on_preview_ended(&tracks, 1, &mut audio).unwrap();
        let stops_before = audio.stops;

        assert_eq!(
            seq.play_all(&tracks, &mut audio).unwrap(),
            Transition::Started { index: 1 }
        );
        assert_eq!(audio.stops, stops_before + 1);
        assert_eq!(audio.started, vec![1, 3, 1]);
        assert_eq!(audio.overlaps, 0);
    }

    #[test]
    fn reindex_follows_playing_entry() {
        let tracks = vec![track("M", true), track("Z", true), track("A", true)];
        let mut audio = RecordingAudio::default();
        let mut seq = PlaybackSequencer::new();
        assert_eq!(seq.reindex(&tracks), None);
        seq.play_all(&tracks, &mut audio).unwrap();

        let reordered = vec![tracks[2].clone(), tracks[0].clone(), tracks[1].clone()];
        assert_eq!(seq.reindex(&reordered), Some(1));
        assert_eq!(seq.playing_entry_id(), Some("M"));

        // the old index is now stale
        assert_eq!(
            seq.on_preview_ended(&reordered, 0, &mut audio).unwrap(),
            Transition::Unchanged
        );
        assert_eq!(
            seq.on_preview_ended(&reordered, 1, &mut audio).unwrap(),
            Transition::Advanced { from: 1, to: 2 }
        );
        assert_eq!(audio.started, vec![0, 2]);
        assert_eq!(seq.playing_entry_id(), Some("Z"));
    }

    #[test]
    fn stop_is_idempotent() {
        let tracks = mixed();
        let mut audio = RecordingAudio::default();
        let mut seq = PlaybackSequencer::new();

        assert_eq!(seq.stop(&mut audio), Transition::Unchanged);
        seq.play_all(&tracks, &mut audio).unwrap();
        assert_eq!(seq.stop(&mut audio), Transition::Stopped);
        assert_eq!(seq.stop(&mut audio), Transition::Unchanged);
        assert_eq!(seq.state(), &SequencerState::Idle);
        assert_eq!(audio.stops, 1);
    }

    #[test]
    fn replay_after_end_with_nothing_playable_is_idle() {
        let mut tracks = vec![track("A", true)];
        let mut audio = RecordingAudio::default();
        let mut seq = PlaybackSequencer::new();
        seq.play_all(&tracks, &mut audio).unwrap();
        seq.on_preview_ended(&tracks, 0, &mut audio).unwrap();
        assert_eq!(seq.state(), &SequencerState::Ended);

        tracks[0].preview = None;
        assert_eq!(
            seq.play_all(&tracks, &mut audio).unwrap(),
            Transition::NothingToPlay
        );
        assert_eq!(seq.state(), &SequencerState::Idle);
    }

    #[test]
    fn stop_after_end_keeps_ended() {
        let tracks = vec![track("A", true)];
        let mut audio = RecordingAudio::default();
        let mut seq = PlaybackSequencer::new();
        seq.play_all(&tracks, &mut audio).unwrap();
        seq.on_preview_ended(&tracks, 0, &mut audio).unwrap();

        assert_eq!(seq.stop(&mut audio), Transition::Unchanged);
        assert_eq!(seq.cursor().state, CursorState::Ended);
    }

    #[test]
    fn failed_start_returns_to_idle() {
        let tracks = mixed();
        let mut audio = RecordingAudio {
            fail_on: Some(3),
            ..RecordingAudio::default()
        };
        let mut seq = PlaybackSequencer::new();
        seq.play_all(&tracks, &mut audio).unwrap();

        let err = seq.on_preview_ended(&tracks, 1, &mut audio).unwrap_err();
        assert_eq!(err, SequencerError::Audio("device busy".to_string()));
        assert_eq!(seq.state(), &SequencerState::Idle);
        assert_eq!(audio.active, None);
    }

    #[test]
    fn play_at_unplayable_is_noop_then_advances() {
        let tracks = mixed();
        let mut audio = RecordingAudio::default();
        let mut seq = PlaybackSequencer::new();

        assert_eq!(
            seq.play_at(&tracks, 0, &mut audio).unwrap(),
            Transition::Unchanged
        );
        assert_eq!(
            seq.play_at(&tracks, 9, &mut audio).unwrap(),
            Transition::Unchanged
        );
        assert_eq!(
            seq.play_at(&tracks, 3, &mut audio).unwrap(),
            Transition::Started { index: 3 }
        );
        assert_eq!(
            seq.on_preview_ended(&tracks, 3, &mut audio).unwrap(),
            Transition::Ended
        );
    }
}
