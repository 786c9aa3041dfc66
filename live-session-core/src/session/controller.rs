use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::config::SessionConfiguration;
use crate::models::error::SessionError;
use crate::models::failure::{AcquisitionStage, SessionFailure};
use crate::models::media_models::FacingMode;
use crate::models::session_summary::{SessionSnapshot, SessionSummary};
use crate::models::state::{Capability, LiveScreen, PermissionState, PlatformPermission};
use crate::session::handle::CaptureHandle;
use crate::traits::live_session::LiveSession;
use crate::traits::media_platform::MediaPlatform;
use crate::traits::session_delegate::SessionDelegate;

/// Internal mutable session state, protected by `parking_lot::Mutex`.
struct ControllerState {
    session_id: Uuid,
    visible: bool,
    camera: PermissionState,
    microphone: PermissionState,
    failure: Option<SessionFailure>,
    muted: bool,
    facing: FacingMode,
    handle: Option<CaptureHandle>,
    // Bumped on every teardown; acquisitions started under an older value are discarded.
    generation: u64,
    started_at: Option<DateTime<Utc>>,
    camera_flips: u32,
}

impl ControllerState {
    fn new(facing: FacingMode) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            visible: false,
            camera: PermissionState::Idle,
            microphone: PermissionState::Idle,
            failure: None,
            muted: false,
            facing,
            handle: None,
            generation: 0,
            started_at: None,
            camera_flips: 0,
        }
    }

    fn set_both(&mut self, state: PermissionState) {
        self.camera = state;
        self.microphone = state;
    }

    fn is_pristine(&self) -> bool {
        self.camera.is_idle() && self.microphone.is_idle() && self.failure.is_none() && self.handle.is_none()
    }

    /// Drop back to idle, handing the open handle (if any) to the caller.
    fn reset(&mut self) -> (Option<CaptureHandle>, Option<SessionSummary>) {
        self.generation += 1;
        self.set_both(PermissionState::Idle);
        self.failure = None;
        self.muted = false;

        let handle = self.handle.take();
        let facing = handle.as_ref().map_or(self.facing, CaptureHandle::facing);
        let summary = self.close_record(facing);
        (handle, summary)
    }

    /// Close the running session record, if one was started.
    fn close_record(&mut self, facing: FacingMode) -> Option<SessionSummary> {
        let started = self.started_at.take()?;
        let flips = std::mem::take(&mut self.camera_flips);
        Some(SessionSummary::new(self.session_id, started, facing, flips))
    }
}

/// How a freshly acquired handle is installed.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Install {
    /// First handle of an attempt: mute resets to off.
    Begin,
    /// Replacement after a camera flip: the mute flag carries over.
    Flip,
}

/// Marks an acquisition as in flight for as long as it lives.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SessionError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::AcquisitionInFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Mediates camera/microphone access for the live view.
///
/// Owns at most one `CaptureHandle`. Camera and microphone permission move
/// in lockstep, and the rendered state never reports granted without a
/// handle or denied with one.
///
/// ```text
/// begin_session:  idle → requesting → granted (handle stored)
///                                  ↘ denied  (failure recorded)
/// retry:          denied → idle
/// end / hide:     * → idle (handle released)
/// ```
///
/// Acquisitions (`begin_session`, `flip_camera`) are mutually exclusive; a
/// second one issued while another is in flight is rejected. The state lock
/// is never held across a platform call.
pub struct LiveSessionController<P: MediaPlatform> {
    platform: P,
    config: SessionConfiguration,
    state: Mutex<ControllerState>,
    in_flight: AtomicBool,
    delegate: Option<Arc<dyn SessionDelegate>>,
}

impl<P: MediaPlatform> LiveSessionController<P> {
    pub fn new(platform: P, config: SessionConfiguration) -> Result<Self, SessionError> {
        config.validate().map_err(SessionError::ConfigurationFailed)?;

        Ok(Self {
            platform,
            state: Mutex::new(ControllerState::new(config.default_facing)),
            config,
            in_flight: AtomicBool::new(false),
            delegate: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn config(&self) -> &SessionConfiguration {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let s = self.state.lock();
        let (failure, error_message) = SessionSnapshot::failure_parts(s.failure.as_ref());
        SessionSnapshot {
            session_id: s.session_id,
            visible: s.visible,
            screen: LiveScreen::select(s.visible, s.camera, s.microphone),
            camera: s.camera,
            microphone: s.microphone,
            failure,
            error_message,
            muted: s.muted,
            facing: s.facing,
            camera_flipped: s.facing != self.config.default_facing,
            has_handle: s.handle.is_some(),
            acquiring: self.in_flight.load(Ordering::Acquire),
        }
    }

    /// Id of the open capture handle, if any.
    pub fn handle_id(&self) -> Option<Uuid> {
        self.state.lock().handle.as_ref().map(CaptureHandle::id)
    }

    /// Request camera + microphone access and open a capture handle.
    ///
    /// Only valid from idle while visible. Platform failures do not return
    /// `Err`; they leave both permissions denied with a recorded failure.
    pub fn begin_session(&self) -> Result<(), SessionError> {
        let in_flight = InFlight::acquire(&self.in_flight)?;

        let (generation, facing) = {
            let mut s = self.state.lock();
            if !s.visible {
                return Err(SessionError::NotVisible);
            }
            if !s.camera.is_idle() || !s.microphone.is_idle() {
                return Err(SessionError::InvalidState {
                    operation: "begin_session",
                    state: s.camera,
                });
            }
            s.set_both(PermissionState::Requesting);
            s.failure = None;
            (s.generation, s.facing)
        };
        self.notify();

        let changed = match self.acquire(facing) {
            Ok(handle) => self.install(generation, handle, Install::Begin),
            Err(failure) => self.fail(generation, failure),
        };
        drop(in_flight);
        if changed {
            self.notify();
        }
        Ok(())
    }

    /// Flip the enabled flag on the handle's audio tracks.
    ///
    /// No-op without an open handle (or without audio tracks). Returns the
    /// resulting mute state.
    pub fn toggle_mute(&self) -> bool {
        let muted = {
            let mut s = self.state.lock();
            let Some(handle) = s.handle.as_ref() else {
                return s.muted;
            };
            let muted = !s.muted;
            if handle.set_audio_enabled(!muted) == 0 {
                log::debug!("Capture handle {} has no audio tracks; mute unchanged", handle.id());
                return s.muted;
            }
            s.muted = muted;
            muted
        };

        log::info!("Microphone {}", if muted { "muted" } else { "unmuted" });
        self.notify();
        muted
    }

    /// Switch to the opposite camera.
    ///
    /// With a handle open, the old handle is released before the new one is
    /// requested. On failure both permissions become denied and the recorded
    /// facing mode stays flipped. Without a handle only the recorded facing
    /// mode changes; it applies to the next `begin_session`.
    pub fn flip_camera(&self) -> Result<(), SessionError> {
        let in_flight = InFlight::acquire(&self.in_flight)?;

        let (generation, facing, previous) = {
            let mut s = self.state.lock();
            if !s.visible {
                return Err(SessionError::NotVisible);
            }
            s.facing = s.facing.opposite();
            if s.handle.is_none() {
                log::debug!("No open capture handle; next session will use {} camera", s.facing);
                (s.generation, s.facing, None)
            } else {
                s.set_both(PermissionState::Requesting);
                (s.generation, s.facing, s.handle.take())
            }
        };

        let Some(previous) = previous else {
            drop(in_flight);
            self.notify();
            return Ok(());
        };

        log::info!("Flipping camera to {}; releasing handle {}", facing, previous.id());
        drop(previous);
        self.notify();

        let changed = match self.request_handle(facing) {
            Ok(handle) => self.install(generation, handle, Install::Flip),
            Err(failure) => self.fail(generation, failure),
        };
        drop(in_flight);
        if changed {
            self.notify();
        }
        Ok(())
    }

    /// Release the capture handle, return to idle and ask the view to leave.
    ///
    /// Idempotent: with nothing open, nothing is released and no state
    /// changes, though the exit request is still delivered.
    pub fn end_session(&self) -> Option<SessionSummary> {
        let summary = self.teardown("session ended");
        if let Some(ref delegate) = self.delegate {
            delegate.on_exit_requested(summary.as_ref());
        }
        summary
    }

    /// Explicit retry from the denied screen. Transitions: denied → idle.
    pub fn retry(&self) -> Result<(), SessionError> {
        if self.in_flight.load(Ordering::Acquire) {
            return Err(SessionError::AcquisitionInFlight);
        }
        {
            let mut s = self.state.lock();
            if !s.camera.is_denied() && !s.microphone.is_denied() {
                return Err(SessionError::InvalidState {
                    operation: "retry",
                    state: s.camera,
                });
            }
            s.set_both(PermissionState::Idle);
            s.failure = None;
        }
        log::debug!("Permission state reset for retry");
        self.notify();
        Ok(())
    }

    /// Visibility hook for the live view.
    ///
    /// Becoming visible starts a fresh session at idle; becoming hidden
    /// releases any open handle. Repeating the current visibility is a no-op.
    pub fn set_visible(&self, visible: bool) {
        let handle_and_summary = {
            let mut s = self.state.lock();
            if s.visible == visible {
                return;
            }
            s.visible = visible;
            let released = s.reset();
            if visible {
                s.session_id = Uuid::new_v4();
            }
            released
        };

        let reason = if visible { "view shown" } else { "view hidden" };
        Self::release(handle_and_summary.0, reason);
        if let Some(summary) = handle_and_summary.1 {
            log::info!(
                "Live session {} closed after {:.1}s ({})",
                summary.session_id,
                summary.duration_secs,
                reason
            );
        }
        self.notify();
    }

    // --- Internal helpers ---

    /// Device checks, optional permission query, then the media request.
    fn acquire(&self, facing: FacingMode) -> Result<CaptureHandle, SessionFailure> {
        if !self.platform.is_supported() {
            return Err(SessionFailure::unsupported());
        }

        let devices = self
            .platform
            .enumerate_devices()
            .map_err(|e| SessionFailure::classify(&e, AcquisitionStage::Enumeration))?;
        let cameras = devices.iter().filter(|d| d.is_video_input()).count();
        let microphones = devices.iter().filter(|d| d.is_audio_input()).count();
        log::info!(
            "Devices found: {} total, {} cameras, {} microphones",
            devices.len(),
            cameras,
            microphones
        );

        if cameras == 0 {
            return Err(SessionFailure::no_camera());
        }
        if microphones == 0 {
            return Err(SessionFailure::no_microphone());
        }

        if self.config.query_permissions {
            self.check_cached_permissions()?;
        }

        self.request_handle(facing)
    }

    fn check_cached_permissions(&self) -> Result<(), SessionFailure> {
        for capability in Capability::ALL {
            match self.platform.query_permission(capability) {
                Ok(PlatformPermission::Denied) => {
                    log::warn!("{} permission is permanently denied", capability);
                    return Err(SessionFailure::permanently_denied());
                }
                Ok(status) => log::debug!("{} permission status: {:?}", capability, status),
                Err(e) => log::debug!("{} permission query unavailable: {}", capability, e),
            }
        }
        Ok(())
    }

    fn request_handle(&self, facing: FacingMode) -> Result<CaptureHandle, SessionFailure> {
        let constraints = self.config.constraints(facing);
        log::info!("Requesting camera ({}) and microphone", facing);

        let tracks = self
            .platform
            .request_media(&constraints)
            .map_err(|e| SessionFailure::classify(&e, AcquisitionStage::Acquisition))?;

        let handle = CaptureHandle::new(tracks, facing);
        log::info!(
            "Capture handle {} acquired: {} video, {} audio tracks",
            handle.id(),
            handle.video_tracks().count(),
            handle.audio_tracks().count()
        );
        Ok(handle)
    }

    /// Store a new handle. Returns false if it was discarded as stale.
    fn install(&self, generation: u64, handle: CaptureHandle, install: Install) -> bool {
        let displaced = {
            let mut s = self.state.lock();
            if s.generation != generation {
                drop(s);
                log::warn!(
                    "Discarding capture handle {}: session was torn down during acquisition",
                    handle.id()
                );
                return false;
            }

            match install {
                Install::Begin => {
                    s.muted = false;
                    handle.set_audio_enabled(true);
                }
                Install::Flip => {
                    handle.set_audio_enabled(!s.muted);
                    s.camera_flips += 1;
                }
            }
            if s.started_at.is_none() {
                s.started_at = Some(handle.acquired_at());
            }
            s.set_both(PermissionState::Granted);
            s.failure = None;
            s.handle.replace(handle)
        };

        if let Some(displaced) = displaced {
            log::warn!("Replacing capture handle {} that was still open", displaced.id());
        }
        true
    }

    /// Record a failed attempt. Returns false if the session was torn down meanwhile.
    fn fail(&self, generation: u64, failure: SessionFailure) -> bool {
        let leftover = {
            let mut s = self.state.lock();
            if s.generation != generation {
                log::debug!("Ignoring failure from a torn-down session: {}", failure);
                return false;
            }
            s.set_both(PermissionState::Denied);
            s.failure = Some(failure.clone());
            s.muted = false;
            // A failed flip has already released the previous handle.
            let facing = s.handle.as_ref().map_or(s.facing, CaptureHandle::facing);
            let summary = s.close_record(facing);
            (s.handle.take(), summary)
        };
        Self::release(leftover.0, "acquisition failed");
        if let Some(summary) = leftover.1 {
            log::info!(
                "Live session {} closed after {:.1}s (acquisition failed)",
                summary.session_id,
                summary.duration_secs
            );
        }

        log::error!("Live session acquisition failed ({}): {}", failure.reason, failure.message);
        if let Some(ref delegate) = self.delegate {
            delegate.on_failure(&failure);
        }
        true
    }

    /// Reset to idle and release the handle. Notifies only if something changed.
    fn teardown(&self, reason: &str) -> Option<SessionSummary> {
        let (changed, handle, summary) = {
            let mut s = self.state.lock();
            let changed = !s.is_pristine();
            let (handle, summary) = s.reset();
            (changed, handle, summary)
        };

        Self::release(handle, reason);
        if changed {
            self.notify();
        }
        summary
    }

    fn release(handle: Option<CaptureHandle>, reason: &str) {
        if let Some(handle) = handle {
            log::info!("Releasing capture handle {} ({})", handle.id(), reason);
            handle.stop();
        }
    }

    fn notify(&self) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&self.snapshot());
        }
    }
}

impl<P: MediaPlatform> LiveSession for LiveSessionController<P> {
    fn snapshot(&self) -> SessionSnapshot {
        LiveSessionController::snapshot(self)
    }

    fn begin_session(&self) -> Result<(), SessionError> {
        LiveSessionController::begin_session(self)
    }

    fn toggle_mute(&self) -> bool {
        LiveSessionController::toggle_mute(self)
    }

    fn flip_camera(&self) -> Result<(), SessionError> {
        LiveSessionController::flip_camera(self)
    }

    fn end_session(&self) -> Option<SessionSummary> {
        LiveSessionController::end_session(self)
    }

    fn retry(&self) -> Result<(), SessionError> {
        LiveSessionController::retry(self)
    }

    fn set_visible(&self, visible: bool) {
        LiveSessionController::set_visible(self, visible)
    }
}
