//! In-process media platform.
//!
//! Behaves like a browser capture API with scripted hardware: device
//! enumeration, a permission store, queued request failures, and exclusive
//! camera access (a second stream while the first is still live fails as
//! `NotReadableError`).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use live_session_core::models::config::MediaConstraints;
use live_session_core::models::error::PlatformError;
use live_session_core::models::media_models::{DeviceKind, MediaDevice, TrackKind};
use live_session_core::models::state::{Capability, PlatformPermission};
use live_session_core::traits::media_platform::{MediaPlatform, MediaTrack};

use crate::devices;
use crate::gate::RequestGate;
use crate::permissions::{PermissionProfile, PermissionTable};
use crate::track::SimulatedTrack;

/// A platform error by name, as written in a profile file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedFailure {
    pub name: String,
    #[serde(default)]
    pub message: String,
}

impl ScriptedFailure {
    pub fn to_error(&self) -> PlatformError {
        PlatformError::from_name(&self.name, self.message.clone())
    }
}

/// Declarative description of a simulated platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationProfile {
    pub supported: bool,
    pub devices: Vec<MediaDevice>,
    pub enumeration_failure: Option<ScriptedFailure>,
    pub permissions: PermissionProfile,
    pub permission_query_supported: bool,
    /// Consumed in order, one per media request.
    pub request_failures: Vec<ScriptedFailure>,
    pub exclusive_devices: bool,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        Self {
            supported: true,
            devices: devices::laptop(),
            enumeration_failure: None,
            permissions: PermissionProfile::default(),
            permission_query_supported: true,
            request_failures: Vec::new(),
            exclusive_devices: true,
        }
    }
}

pub struct SimulatedPlatform {
    supported: AtomicBool,
    exclusive_devices: AtomicBool,
    devices: Mutex<Vec<MediaDevice>>,
    enumeration_failure: Mutex<Option<PlatformError>>,
    permissions: PermissionTable,
    request_failures: Mutex<VecDeque<PlatformError>>,
    issued: Mutex<Vec<Arc<SimulatedTrack>>>,
    requests: Mutex<Vec<MediaConstraints>>,
    gate: Mutex<Option<Arc<RequestGate>>>,
}

impl SimulatedPlatform {
    /// A laptop with one camera and one microphone, nothing granted yet.
    pub fn new() -> Self {
        Self::from_profile(&SimulationProfile::default())
    }

    pub fn with_devices(devices: Vec<MediaDevice>) -> Self {
        Self::from_profile(&SimulationProfile {
            devices,
            ..SimulationProfile::default()
        })
    }

    pub fn from_profile(profile: &SimulationProfile) -> Self {
        Self {
            supported: AtomicBool::new(profile.supported),
            exclusive_devices: AtomicBool::new(profile.exclusive_devices),
            devices: Mutex::new(profile.devices.clone()),
            enumeration_failure: Mutex::new(profile.enumeration_failure.as_ref().map(ScriptedFailure::to_error)),
            permissions: PermissionTable::new(profile.permissions, profile.permission_query_supported),
            request_failures: Mutex::new(profile.request_failures.iter().map(ScriptedFailure::to_error).collect()),
            issued: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
        }
    }

    // --- Scripting ---

    pub fn set_supported(&self, supported: bool) {
        self.supported.store(supported, Ordering::SeqCst);
    }

    pub fn set_exclusive_devices(&self, exclusive: bool) {
        self.exclusive_devices.store(exclusive, Ordering::SeqCst);
    }

    pub fn set_devices(&self, devices: Vec<MediaDevice>) {
        *self.devices.lock() = devices;
    }

    pub fn fail_enumeration(&self, error: Option<PlatformError>) {
        *self.enumeration_failure.lock() = error;
    }

    pub fn set_permission(&self, capability: Capability, status: PlatformPermission) {
        self.permissions.set(capability, status);
    }

    /// Make the next media request fail with `error`.
    pub fn push_request_failure(&self, error: PlatformError) {
        self.request_failures.lock().push_back(error);
    }

    /// Hold every subsequent media request at `gate` until it opens.
    pub fn install_gate(&self, gate: Arc<RequestGate>) {
        *self.gate.lock() = Some(gate);
    }

    pub fn remove_gate(&self) {
        *self.gate.lock() = None;
    }

    // --- Inspection ---

    pub fn permissions(&self) -> PermissionProfile {
        self.permissions.snapshot()
    }

    /// Every track handed out so far, live or stopped.
    pub fn issued_tracks(&self) -> Vec<Arc<SimulatedTrack>> {
        self.issued.lock().clone()
    }

    pub fn live_tracks(&self) -> Vec<Arc<SimulatedTrack>> {
        self.issued
            .lock()
            .iter()
            .filter(|t| t.is_live())
            .cloned()
            .collect()
    }

    /// Number of distinct streams with at least one live track.
    pub fn open_streams(&self) -> usize {
        let mut streams: Vec<Uuid> = self.live_tracks().iter().map(|t| t.stream_id()).collect();
        streams.sort();
        streams.dedup();
        streams.len()
    }

    /// Constraints of every media request received, in order.
    pub fn requests(&self) -> Vec<MediaConstraints> {
        self.requests.lock().clone()
    }

    fn camera_in_use(&self) -> bool {
        self.issued
            .lock()
            .iter()
            .any(|t| t.kind() == TrackKind::Video && t.is_live())
    }
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaPlatform for SimulatedPlatform {
    fn is_supported(&self) -> bool {
        self.supported.load(Ordering::SeqCst)
    }

    fn enumerate_devices(&self) -> Result<Vec<MediaDevice>, PlatformError> {
        if let Some(error) = self.enumeration_failure.lock().clone() {
            return Err(error);
        }
        Ok(self.devices.lock().clone())
    }

    fn query_permission(&self, capability: Capability) -> Result<PlatformPermission, PlatformError> {
        self.permissions.query(capability)
    }

    fn request_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Vec<Arc<dyn MediaTrack>>, PlatformError> {
        self.requests.lock().push(*constraints);
        log::debug!("Simulated media request: {:?}", constraints);

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.pass();
        }

        if let Some(error) = self.request_failures.lock().pop_front() {
            return Err(error);
        }
        if self.permissions.snapshot().any_denied() {
            return Err(PlatformError::NotAllowed("Permission denied".into()));
        }

        let devices = self.devices.lock().clone();
        if !devices.iter().any(MediaDevice::is_video_input) || !devices.iter().any(MediaDevice::is_audio_input) {
            return Err(PlatformError::NotFound("Requested device not found".into()));
        }
        if self.exclusive_devices.load(Ordering::SeqCst) && self.camera_in_use() {
            return Err(PlatformError::NotReadable("Could not start video source".into()));
        }

        let stream_id = Uuid::new_v4();
        let video = Arc::new(SimulatedTrack::new(
            stream_id,
            TrackKind::Video,
            devices::first_label(&devices, DeviceKind::VideoInput),
            Some(constraints.video.facing_mode),
        ));
        let audio = Arc::new(SimulatedTrack::new(
            stream_id,
            TrackKind::Audio,
            devices::first_label(&devices, DeviceKind::AudioInput),
            None,
        ));

        self.permissions.grant_prompted();
        self.issued.lock().extend([Arc::clone(&video), Arc::clone(&audio)]);
        log::debug!("Simulated stream {} opened", stream_id);

        Ok(vec![video as Arc<dyn MediaTrack>, audio as Arc<dyn MediaTrack>])
    }
}
