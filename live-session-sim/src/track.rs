//! Simulated capture track.
//!
//! Tracks are shared between the platform (which keeps every track it ever
//! issued for inspection) and the controller's capture handle, so state is
//! held in atomics.

use std::sync::atomic::{AtomicBool, Ordering};

use live_session_core::models::media_models::{FacingMode, TrackKind, TrackState};
use live_session_core::traits::media_platform::MediaTrack;
use uuid::Uuid;

pub struct SimulatedTrack {
    id: String,
    stream_id: Uuid,
    kind: TrackKind,
    label: String,
    facing: Option<FacingMode>,
    enabled: AtomicBool,
    live: AtomicBool,
}

impl SimulatedTrack {
    pub fn new(stream_id: Uuid, kind: TrackKind, label: impl Into<String>, facing: Option<FacingMode>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            stream_id,
            kind,
            label: label.into(),
            facing,
            enabled: AtomicBool::new(true),
            live: AtomicBool::new(true),
        }
    }

    /// Id shared by all tracks from the same media request.
    pub fn stream_id(&self) -> Uuid {
        self.stream_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Camera a video track was opened with. `None` for audio.
    pub fn facing(&self) -> Option<FacingMode> {
        self.facing
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

impl MediaTrack for SimulatedTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            log::debug!("Simulated {:?} track {} stopped", self.kind, self.id);
        }
    }

    fn ready_state(&self) -> TrackState {
        if self.is_live() {
            TrackState::Live
        } else {
            TrackState::Ended
        }
    }
}
