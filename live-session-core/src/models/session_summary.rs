use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::failure::{FailureReason, SessionFailure};
use super::media_models::FacingMode;
use super::state::{LiveScreen, PermissionState};

/// Produced when a live session that held a capture handle is released.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub facing: FacingMode,
    pub camera_flips: u32,
}

impl SessionSummary {
    pub fn new(
        session_id: Uuid,
        started_at: DateTime<Utc>,
        facing: FacingMode,
        camera_flips: u32,
    ) -> Self {
        let ended_at = Utc::now();
        let duration_secs = (ended_at - started_at).num_milliseconds().max(0) as f64 / 1000.0;
        Self {
            session_id,
            started_at,
            ended_at,
            duration_secs,
            facing,
            camera_flips,
        }
    }
}

/// Everything the view layer needs to render the live screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub visible: bool,
    pub screen: LiveScreen,
    pub camera: PermissionState,
    pub microphone: PermissionState,
    pub failure: Option<FailureReason>,
    pub error_message: Option<String>,
    pub muted: bool,
    pub facing: FacingMode,
    pub camera_flipped: bool,
    pub has_handle: bool,
    pub acquiring: bool,
}

impl SessionSnapshot {
    pub(crate) fn failure_parts(failure: Option<&SessionFailure>) -> (Option<FailureReason>, Option<String>) {
        match failure {
            Some(f) => (Some(f.reason), Some(f.message.clone())),
            None => (None, None),
        }
    }

    /// Granted implies a held handle; denied implies none.
    pub fn is_consistent(&self) -> bool {
        let granted = self.camera.is_granted() || self.microphone.is_granted();
        let denied = self.camera.is_denied() || self.microphone.is_denied();
        !(granted && !self.has_handle) && !(denied && self.has_handle)
    }
}
