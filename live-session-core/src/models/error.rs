use thiserror::Error;

use super::state::PermissionState;

/// Errors reported by a media platform.
///
/// Variants follow the error names a capture API reports
/// (`NotAllowedError`, `NotFoundError`, ...); anything unrecognized is kept
/// verbatim in `Other`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("NotAllowedError: {0}")]
    NotAllowed(String),

    #[error("NotFoundError: {0}")]
    NotFound(String),

    #[error("NotReadableError: {0}")]
    NotReadable(String),

    #[error("SecurityError: {0}")]
    Security(String),

    #[error("NotSupportedError: {0}")]
    NotSupported(String),

    #[error("{name}: {message}")]
    Other { name: String, message: String },
}

impl PlatformError {
    /// Build an error from a platform error name and message.
    pub fn from_name(name: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match name {
            "NotAllowedError" | "PermissionDeniedError" => Self::NotAllowed(message),
            "NotFoundError" | "DevicesNotFoundError" => Self::NotFound(message),
            "NotReadableError" | "TrackStartError" => Self::NotReadable(message),
            "SecurityError" => Self::Security(message),
            "NotSupportedError" => Self::NotSupported(message),
            _ => Self::Other {
                name: name.to_string(),
                message,
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::NotAllowed(_) => "NotAllowedError",
            Self::NotFound(_) => "NotFoundError",
            Self::NotReadable(_) => "NotReadableError",
            Self::Security(_) => "SecurityError",
            Self::NotSupported(_) => "NotSupportedError",
            Self::Other { name, .. } => name,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::NotAllowed(m)
            | Self::NotFound(m)
            | Self::NotReadable(m)
            | Self::Security(m)
            | Self::NotSupported(m) => m,
            Self::Other { message, .. } => message,
        }
    }
}

/// Rejected controller operations.
///
/// These signal caller misuse. Platform failures never surface here; they
/// are recorded on the session as a `SessionFailure`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("an acquisition is already in flight")]
    AcquisitionInFlight,

    #[error("{operation} is not allowed while camera permission is {state}")]
    InvalidState {
        operation: &'static str,
        state: PermissionState,
    },

    #[error("the live view is not visible")]
    NotVisible,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),
}
