use std::fmt;

use serde::{Deserialize, Serialize};

/// Authorization progress for one capability (camera or microphone).
///
/// State transitions:
/// ```text
/// idle → requesting → granted
///            ↓
///         denied → idle   (explicit retry only)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    #[default]
    Idle,
    Requesting,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_requesting(&self) -> bool {
        matches!(self, Self::Requesting)
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hardware capability the session needs authorization for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Camera,
    Microphone,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::Camera, Capability::Microphone];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera => f.write_str("camera"),
            Self::Microphone => f.write_str("microphone"),
        }
    }
}

/// Cached grant status as reported by the platform's permission query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformPermission {
    Granted,
    #[default]
    Prompt,
    Denied,
}

/// Which screen the live view should render for a given state.
///
/// Camera state drives the prompt screen; either capability being denied
/// shows the denied screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LiveScreen {
    Hidden,
    PermissionPrompt,
    PermissionDenied,
    Live,
}

impl LiveScreen {
    pub fn select(visible: bool, camera: PermissionState, microphone: PermissionState) -> Self {
        if !visible {
            return Self::Hidden;
        }
        if camera.is_idle() || camera.is_requesting() {
            return Self::PermissionPrompt;
        }
        if camera.is_denied() || microphone.is_denied() {
            return Self::PermissionDenied;
        }
        Self::Live
    }
}
