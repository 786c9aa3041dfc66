use std::sync::Arc;

use crate::models::config::MediaConstraints;
use crate::models::error::PlatformError;
use crate::models::media_models::{MediaDevice, TrackKind, TrackState};
use crate::models::state::{Capability, PlatformPermission};

/// One live audio or video track handed out by a platform.
///
/// Tracks are shared handles, so mutation goes through `&self`.
/// `stop()` must be idempotent and leave the track `Ended` for good.
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    fn enabled(&self) -> bool;

    /// Enable or disable delivery without releasing the device.
    fn set_enabled(&self, enabled: bool);

    /// Release the underlying device.
    fn stop(&self);

    fn ready_state(&self) -> TrackState;
}

/// The platform's camera/microphone capture capability.
///
/// Implemented by:
/// - `SimulatedPlatform` (live-session-sim)
/// - any host offering device enumeration, permission query and
///   constraint-based media requests
pub trait MediaPlatform: Send + Sync {
    /// Whether media capture exists at all on this platform.
    fn is_supported(&self) -> bool;

    /// List input and output devices.
    fn enumerate_devices(&self) -> Result<Vec<MediaDevice>, PlatformError>;

    /// Cached grant status for a capability. Platforms without a
    /// permission query return an error, which callers treat as "unknown".
    fn query_permission(&self, capability: Capability) -> Result<PlatformPermission, PlatformError>;

    /// Request a combined audio+video stream.
    ///
    /// Blocks until the platform grants or rejects the request. There is no
    /// timeout.
    fn request_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Vec<Arc<dyn MediaTrack>>, PlatformError>;
}

impl<P: MediaPlatform + ?Sized> MediaPlatform for Arc<P> {
    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }

    fn enumerate_devices(&self) -> Result<Vec<MediaDevice>, PlatformError> {
        (**self).enumerate_devices()
    }

    fn query_permission(&self, capability: Capability) -> Result<PlatformPermission, PlatformError> {
        (**self).query_permission(capability)
    }

    fn request_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Vec<Arc<dyn MediaTrack>>, PlatformError> {
        (**self).request_media(constraints)
    }
}
