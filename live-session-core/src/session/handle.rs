use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::media_models::{FacingMode, TrackKind, TrackState};
use crate::traits::media_platform::MediaTrack;

/// Exclusive owner of the tracks from one media request.
///
/// Dropping the handle stops every track, so a handle that goes out of
/// scope on any path releases its devices.
pub struct CaptureHandle {
    id: Uuid,
    facing: FacingMode,
    acquired_at: DateTime<Utc>,
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl CaptureHandle {
    pub fn new(tracks: Vec<Arc<dyn MediaTrack>>, facing: FacingMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            facing,
            acquired_at: Utc::now(),
            tracks,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Camera the handle was requested with.
    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks_of(TrackKind::Audio)
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks_of(TrackKind::Video)
    }

    /// True while any track is still live.
    pub fn is_active(&self) -> bool {
        self.tracks
            .iter()
            .any(|t| t.ready_state() == TrackState::Live)
    }

    /// Enabled flag of the first audio track, if there is one.
    pub fn audio_enabled(&self) -> Option<bool> {
        self.audio_tracks().next().map(|t| t.enabled())
    }

    /// Set the enabled flag on every audio track. Returns how many were touched.
    pub fn set_audio_enabled(&self, enabled: bool) -> usize {
        let mut count = 0;
        for track in self.audio_tracks() {
            track.set_enabled(enabled);
            count += 1;
        }
        count
    }

    /// Stop every track. Safe to call more than once.
    pub fn stop(&self) {
        for track in &self.tracks {
            if track.ready_state() == TrackState::Live {
                track.stop();
            }
        }
    }

    fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks.iter().filter(move |t| t.kind() == kind)
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        if self.is_active() {
            log::debug!("Stopping {} tracks of capture handle {}", self.tracks.len(), self.id);
        }
        self.stop();
    }
}

impl fmt::Debug for CaptureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureHandle")
            .field("id", &self.id)
            .field("facing", &self.facing)
            .field("acquired_at", &self.acquired_at)
            .field("tracks", &self.tracks.len())
            .field("active", &self.is_active())
            .finish()
    }
}
