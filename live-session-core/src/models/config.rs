use serde::{Deserialize, Serialize};

use super::media_models::FacingMode;

/// Largest ideal dimension accepted for the video constraint.
const MAX_IDEAL_DIMENSION: u32 = 4096;

/// Configuration for a live session.
///
/// Every field has a default, so a partial JSON object deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfiguration {
    /// Camera used for the first acquisition (default: user-facing).
    pub default_facing: FacingMode,

    /// Ideal capture width in pixels (default: 1280).
    pub ideal_width: u32,

    /// Ideal capture height in pixels (default: 720).
    pub ideal_height: u32,

    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,

    /// Query the platform's cached permission status before requesting
    /// media, failing fast on a permanent denial (default: true).
    pub query_permissions: bool,
}

impl SessionConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.ideal_width == 0 || self.ideal_height == 0 {
            return Err("ideal resolution must be non-zero".into());
        }
        if self.ideal_width > MAX_IDEAL_DIMENSION || self.ideal_height > MAX_IDEAL_DIMENSION {
            return Err(format!(
                "ideal resolution {}x{} exceeds {}",
                self.ideal_width, self.ideal_height, MAX_IDEAL_DIMENSION
            ));
        }
        Ok(())
    }

    /// Constraint set for a combined audio+video request with the given camera.
    pub fn constraints(&self, facing: FacingMode) -> MediaConstraints {
        MediaConstraints {
            video: VideoConstraints {
                facing_mode: facing,
                ideal_width: self.ideal_width,
                ideal_height: self.ideal_height,
            },
            audio: AudioConstraints {
                echo_cancellation: self.echo_cancellation,
                noise_suppression: self.noise_suppression,
                auto_gain_control: self.auto_gain_control,
            },
        }
    }
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            default_facing: FacingMode::User,
            ideal_width: 1280,
            ideal_height: 720,
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
            query_permissions: true,
        }
    }
}

/// Declarative constraint set passed to the platform when requesting media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaConstraints {
    pub video: VideoConstraints,
    pub audio: AudioConstraints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}
