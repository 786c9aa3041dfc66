use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::PlatformError;

/// Classified cause of a failed acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    NoCameraDevice,
    NoMicrophoneDevice,
    PermissionDenied,
    DeviceNotFound,
    DeviceBusy,
    InsecureContext,
    UnsupportedPlatform,
    Unknown,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoCameraDevice => "no-camera-device",
            Self::NoMicrophoneDevice => "no-microphone-device",
            Self::PermissionDenied => "permission-denied",
            Self::DeviceNotFound => "device-not-found",
            Self::DeviceBusy => "device-busy",
            Self::InsecureContext => "insecure-context",
            Self::UnsupportedPlatform => "unsupported-platform",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step of the acquisition sequence a platform error came from.
///
/// Only affects message wording; the reason taxonomy is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionStage {
    Enumeration,
    Acquisition,
}

/// A failed attempt: the classified reason plus the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFailure {
    pub reason: FailureReason,
    pub message: String,
}

impl SessionFailure {
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    pub fn no_camera() -> Self {
        Self::new(
            FailureReason::NoCameraDevice,
            "No cameras detected on your system. Please connect a camera and try again.",
        )
    }

    pub fn no_microphone() -> Self {
        Self::new(
            FailureReason::NoMicrophoneDevice,
            "No microphones detected on your system. Please connect a microphone and try again.",
        )
    }

    pub fn permanently_denied() -> Self {
        Self::new(
            FailureReason::PermissionDenied,
            "Permissions have been permanently denied. Please enable them in your settings.",
        )
    }

    pub fn unsupported() -> Self {
        Self::new(
            FailureReason::UnsupportedPlatform,
            "Camera/microphone access is not supported on this platform.",
        )
    }

    /// Map a platform error onto the failure taxonomy.
    pub fn classify(error: &PlatformError, stage: AcquisitionStage) -> Self {
        match error {
            PlatformError::NotAllowed(_) => Self::new(
                FailureReason::PermissionDenied,
                "Camera and microphone access denied. Allow camera/microphone access in your privacy settings and try again.",
            ),
            PlatformError::NotFound(_) => Self::new(
                FailureReason::DeviceNotFound,
                "No camera or microphone found. Please make sure your devices are connected, not in use by other applications, and properly installed.",
            ),
            PlatformError::NotReadable(_) => Self::new(
                FailureReason::DeviceBusy,
                "Camera/microphone is being used by another application. Please close other apps using these devices.",
            ),
            PlatformError::Security(_) => Self::new(
                FailureReason::InsecureContext,
                "Security error: camera/microphone access requires a secure (HTTPS or localhost) context.",
            ),
            PlatformError::NotSupported(_) => Self::unsupported(),
            PlatformError::Other { message, .. } => match stage {
                AcquisitionStage::Enumeration => Self::new(
                    FailureReason::Unknown,
                    format!("Could not detect devices: {}", message),
                ),
                AcquisitionStage::Acquisition => Self::new(
                    FailureReason::Unknown,
                    format!("Error accessing camera/microphone: {}", message),
                ),
            },
        }
    }
}

impl fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.message)
    }
}
