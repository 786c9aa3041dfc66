//! Device presets for the simulated platform.

use live_session_core::models::media_models::{DeviceKind, MediaDevice};

/// One built-in camera, one microphone, one speaker.
pub fn laptop() -> Vec<MediaDevice> {
    vec![
        grouped("cam-builtin", "FaceTime HD Camera", DeviceKind::VideoInput, "builtin"),
        grouped("mic-builtin", "Built-in Microphone", DeviceKind::AudioInput, "builtin"),
        grouped("spk-builtin", "Built-in Speakers", DeviceKind::AudioOutput, "builtin"),
    ]
}

/// Front and rear cameras plus a microphone.
pub fn phone() -> Vec<MediaDevice> {
    vec![
        grouped("cam-front", "Front Camera", DeviceKind::VideoInput, "front"),
        grouped("cam-back", "Back Camera", DeviceKind::VideoInput, "back"),
        MediaDevice::new("mic-bottom", "iPhone Microphone", DeviceKind::AudioInput),
    ]
}

/// Microphone and speaker only.
pub fn without_camera() -> Vec<MediaDevice> {
    laptop()
        .into_iter()
        .filter(|d| !d.is_video_input())
        .collect()
}

/// Camera and speaker only.
pub fn without_microphone() -> Vec<MediaDevice> {
    laptop()
        .into_iter()
        .filter(|d| !d.is_audio_input())
        .collect()
}

pub(crate) fn first_label(devices: &[MediaDevice], kind: DeviceKind) -> String {
    devices
        .iter()
        .find(|d| d.kind == kind)
        .map(|d| d.label.clone())
        .unwrap_or_default()
}

fn grouped(id: &str, label: &str, kind: DeviceKind, group: &str) -> MediaDevice {
    MediaDevice {
        group_id: Some(group.to_string()),
        ..MediaDevice::new(id, label, kind)
    }
}
