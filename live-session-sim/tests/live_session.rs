use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;

use live_session_core::{
    Capability, FacingMode, FailureReason, LiveScreen, LiveSession, LiveSessionController, MediaTrack,
    PermissionState, PlatformError, PlatformPermission, SessionConfiguration, SessionDelegate,
    SessionError, SessionFailure, SessionSnapshot, SessionSummary, TrackState,
};
use live_session_sim::{devices, RequestGate, SimulatedPlatform};

type Controller = LiveSessionController<Arc<SimulatedPlatform>>;

#[derive(Default)]
struct Recorder {
    snapshots: Mutex<Vec<SessionSnapshot>>,
    failures: Mutex<Vec<SessionFailure>>,
    exits: Mutex<Vec<Option<SessionSummary>>>,
}

impl SessionDelegate for Recorder {
    fn on_state_changed(&self, snapshot: &SessionSnapshot) {
        self.snapshots.lock().push(snapshot.clone());
    }

    fn on_failure(&self, failure: &SessionFailure) {
        self.failures.lock().push(failure.clone());
    }

    fn on_exit_requested(&self, summary: Option<&SessionSummary>) {
        self.exits.lock().push(summary.cloned());
    }
}

fn setup(platform: SimulatedPlatform) -> (Arc<SimulatedPlatform>, Controller, Arc<Recorder>) {
    setup_with(platform, SessionConfiguration::default())
}

fn setup_with(
    platform: SimulatedPlatform,
    config: SessionConfiguration,
) -> (Arc<SimulatedPlatform>, Controller, Arc<Recorder>) {
    let platform = Arc::new(platform);
    let recorder = Arc::new(Recorder::default());
    let mut controller = LiveSessionController::new(Arc::clone(&platform), config).unwrap();
    controller.set_delegate(recorder.clone());
    controller.set_visible(true);
    (platform, controller, recorder)
}

fn assert_all_consistent(recorder: &Recorder) {
    for snapshot in recorder.snapshots.lock().iter() {
        assert!(snapshot.is_consistent(), "inconsistent snapshot: {:?}", snapshot);
    }
}

#[test]
fn grant_opens_handle_with_mute_off() {
    let (platform, controller, _) = setup(SimulatedPlatform::new());

    controller.begin_session().unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.camera, PermissionState::Granted);
    assert_eq!(snapshot.microphone, PermissionState::Granted);
    assert_eq!(snapshot.screen, LiveScreen::Live);
    assert!(snapshot.has_handle);
    assert!(!snapshot.muted);
    assert!(!snapshot.acquiring);
    assert_eq!(platform.open_streams(), 1);

    let request = platform.requests()[0];
    assert_eq!(request.video.facing_mode, FacingMode::User);
    assert!(request.audio.echo_cancellation);
    assert!(request.audio.noise_suppression);
}

#[test]
fn missing_camera_is_denied_without_request() {
    let (platform, controller, recorder) =
        setup(SimulatedPlatform::with_devices(devices::without_camera()));

    controller.begin_session().unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.camera, PermissionState::Denied);
    assert_eq!(snapshot.microphone, PermissionState::Denied);
    assert_eq!(snapshot.failure, Some(FailureReason::NoCameraDevice));
    assert_eq!(snapshot.screen, LiveScreen::PermissionDenied);
    assert!(!snapshot.has_handle);
    assert!(platform.requests().is_empty());
    assert_eq!(recorder.failures.lock().len(), 1);
}

#[test]
fn missing_microphone_is_denied() {
    let (_, controller, _) = setup(SimulatedPlatform::with_devices(devices::without_microphone()));

    controller.begin_session().unwrap();

    assert_eq!(controller.snapshot().failure, Some(FailureReason::NoMicrophoneDevice));
}

#[test]
fn permanent_denial_short_circuits() {
    let platform = SimulatedPlatform::new();
    platform.set_permission(Capability::Microphone, PlatformPermission::Denied);
    let (platform, controller, _) = setup(platform);

    controller.begin_session().unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.failure, Some(FailureReason::PermissionDenied));
    assert!(snapshot.error_message.unwrap().contains("permanently denied"));
    assert!(platform.requests().is_empty());
}

#[test]
fn skipping_the_permission_query_reports_not_allowed() {
    let platform = SimulatedPlatform::new();
    platform.set_permission(Capability::Camera, PlatformPermission::Denied);
    let config = SessionConfiguration {
        query_permissions: false,
        ..Default::default()
    };
    let (platform, controller, _) = setup_with(platform, config);

    controller.begin_session().unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.failure, Some(FailureReason::PermissionDenied));
    assert!(!snapshot.error_message.unwrap().contains("permanently"));
    assert_eq!(platform.requests().len(), 1);
}

#[test]
fn unsupported_permission_query_is_ignored() {
    let profile = live_session_sim::SimulationProfile {
        permission_query_supported: false,
        ..Default::default()
    };
    let (_, controller, _) = setup(SimulatedPlatform::from_profile(&profile));

    controller.begin_session().unwrap();

    assert_eq!(controller.snapshot().camera, PermissionState::Granted);
}

#[test]
fn platform_errors_are_classified() {
    let cases = [
        (PlatformError::NotAllowed("denied".into()), FailureReason::PermissionDenied),
        (PlatformError::NotFound("gone".into()), FailureReason::DeviceNotFound),
        (PlatformError::NotReadable("busy".into()), FailureReason::DeviceBusy),
        (PlatformError::Security("http".into()), FailureReason::InsecureContext),
        (PlatformError::from_name("AbortError", "glitch"), FailureReason::Unknown),
    ];

    for (error, expected) in cases {
        let platform = SimulatedPlatform::new();
        platform.push_request_failure(error);
        let (_, controller, _) = setup(platform);

        controller.begin_session().unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.failure, Some(expected));
        assert_eq!(snapshot.camera, PermissionState::Denied);
        assert!(!snapshot.has_handle);
    }
}

#[test]
fn unsupported_platform_fails_before_enumeration() {
    let platform = SimulatedPlatform::new();
    platform.set_supported(false);
    let (_, controller, _) = setup(platform);

    controller.begin_session().unwrap();

    assert_eq!(controller.snapshot().failure, Some(FailureReason::UnsupportedPlatform));
}

#[test]
fn enumeration_failure_uses_device_detection_wording() {
    let platform = SimulatedPlatform::new();
    platform.fail_enumeration(Some(PlatformError::from_name("AbortError", "bus reset")));
    let (_, controller, _) = setup(platform);

    controller.begin_session().unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.failure, Some(FailureReason::Unknown));
    assert_eq!(
        snapshot.error_message.as_deref(),
        Some("Could not detect devices: bus reset")
    );
}

#[test]
fn state_and_handle_stay_consistent_across_attempts() {
    let platform = SimulatedPlatform::new();
    platform.push_request_failure(PlatformError::NotReadable("busy".into()));
    let (platform, controller, recorder) = setup(platform);

    controller.begin_session().unwrap();
    assert_eq!(controller.snapshot().camera, PermissionState::Denied);

    assert!(matches!(
        controller.begin_session(),
        Err(SessionError::InvalidState { .. })
    ));

    controller.retry().unwrap();
    controller.begin_session().unwrap();
    assert_eq!(controller.snapshot().camera, PermissionState::Granted);

    assert!(matches!(
        controller.begin_session(),
        Err(SessionError::InvalidState { state: PermissionState::Granted, .. })
    ));
    assert_eq!(platform.open_streams(), 1);

    controller.end_session();
    controller.begin_session().unwrap();

    assert_all_consistent(&recorder);
    assert!(controller.snapshot().is_consistent());
    assert_eq!(platform.open_streams(), 1);
}

#[test]
fn retry_requires_denied_state() {
    let (_, controller, _) = setup(SimulatedPlatform::new());

    assert!(matches!(
        controller.retry(),
        Err(SessionError::InvalidState { operation: "retry", .. })
    ));
}

#[test]
fn begin_requires_visible_view() {
    let platform = Arc::new(SimulatedPlatform::new());
    let controller = LiveSessionController::new(platform, SessionConfiguration::default()).unwrap();

    assert_eq!(controller.begin_session(), Err(SessionError::NotVisible));
    assert_eq!(controller.snapshot().screen, LiveScreen::Hidden);
}

#[test]
fn toggle_mute_twice_restores_track() {
    let (platform, controller, _) = setup(SimulatedPlatform::new());
    controller.begin_session().unwrap();

    let audio = platform
        .live_tracks()
        .into_iter()
        .find(|t| t.kind() == live_session_core::TrackKind::Audio)
        .unwrap();
    assert!(audio.enabled());

    assert!(controller.toggle_mute());
    assert!(controller.snapshot().muted);
    assert!(!audio.enabled());

    assert!(!controller.toggle_mute());
    assert!(!controller.snapshot().muted);
    assert!(audio.enabled());
}

#[test]
fn toggle_mute_without_handle_is_noop() {
    let (_, controller, recorder) = setup(SimulatedPlatform::new());
    let before = recorder.snapshots.lock().len();

    assert!(!controller.toggle_mute());
    assert!(!controller.snapshot().muted);
    assert_eq!(recorder.snapshots.lock().len(), before);
}

#[test]
fn flip_replaces_handle_and_stops_previous_tracks() {
    let (platform, controller, recorder) = setup(SimulatedPlatform::with_devices(devices::phone()));
    controller.begin_session().unwrap();
    let first_handle = controller.handle_id().unwrap();
    let first_tracks = platform.issued_tracks();

    controller.flip_camera().unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.camera, PermissionState::Granted);
    assert_eq!(snapshot.facing, FacingMode::Environment);
    assert!(snapshot.camera_flipped);
    assert_ne!(controller.handle_id(), Some(first_handle));

    assert!(first_tracks.iter().all(|t| t.ready_state() == TrackState::Ended));
    assert_eq!(platform.open_streams(), 1);

    let live_video = platform
        .live_tracks()
        .into_iter()
        .find(|t| t.facing().is_some())
        .unwrap();
    assert_eq!(live_video.facing(), Some(FacingMode::Environment));
    assert_eq!(platform.requests()[1].video.facing_mode, FacingMode::Environment);
    assert_all_consistent(&recorder);
}

#[test]
fn flip_carries_mute_to_new_audio_track() {
    let (platform, controller, _) = setup(SimulatedPlatform::new());
    controller.begin_session().unwrap();
    controller.toggle_mute();

    controller.flip_camera().unwrap();

    let audio = platform
        .live_tracks()
        .into_iter()
        .find(|t| t.kind() == live_session_core::TrackKind::Audio)
        .unwrap();
    assert!(controller.snapshot().muted);
    assert!(!audio.enabled());
}

#[test]
fn failed_flip_denies_and_keeps_flipped_facing() {
    let (platform, controller, recorder) = setup(SimulatedPlatform::new());
    controller.begin_session().unwrap();
    platform.push_request_failure(PlatformError::NotFound("no rear camera".into()));

    controller.flip_camera().unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.camera, PermissionState::Denied);
    assert_eq!(snapshot.microphone, PermissionState::Denied);
    assert_eq!(snapshot.failure, Some(FailureReason::DeviceNotFound));
    assert_eq!(snapshot.facing, FacingMode::Environment);
    assert!(!snapshot.has_handle);
    assert!(platform.live_tracks().is_empty());
    assert_all_consistent(&recorder);
}

#[test]
fn failed_flip_closes_the_session_record() {
    let (platform, controller, recorder) = setup(SimulatedPlatform::new());
    controller.begin_session().unwrap();
    platform.push_request_failure(PlatformError::NotFound("no rear camera".into()));
    controller.flip_camera().unwrap();

    thread::sleep(Duration::from_millis(50));
    controller.retry().unwrap();
    let second_begin = Utc::now();
    controller.begin_session().unwrap();

    let summary = controller.end_session().unwrap();
    assert!(summary.started_at >= second_begin, "summary started before the second handle");
    assert_eq!(summary.camera_flips, 0);
    assert_eq!(recorder.exits.lock().len(), 1);
}

#[test]
fn flip_without_handle_only_changes_next_facing() {
    let (platform, controller, _) = setup(SimulatedPlatform::new());

    controller.flip_camera().unwrap();
    assert!(platform.requests().is_empty());
    assert_eq!(controller.snapshot().facing, FacingMode::Environment);

    controller.begin_session().unwrap();
    assert_eq!(platform.requests()[0].video.facing_mode, FacingMode::Environment);
}

#[test]
fn end_session_releases_and_is_idempotent() {
    let (platform, controller, recorder) = setup(SimulatedPlatform::new());
    controller.begin_session().unwrap();
    controller.flip_camera().unwrap();

    let summary = controller.end_session().unwrap();
    assert_eq!(summary.session_id, controller.snapshot().session_id);
    assert_eq!(summary.camera_flips, 1);
    assert_eq!(summary.facing, FacingMode::Environment);
    assert!(platform.live_tracks().is_empty());

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.camera, PermissionState::Idle);
    assert!(!snapshot.has_handle);

    let notified = recorder.snapshots.lock().len();
    assert!(controller.end_session().is_none());
    assert_eq!(recorder.snapshots.lock().len(), notified);
    assert_eq!(controller.snapshot(), snapshot);

    let exits = recorder.exits.lock();
    assert_eq!(exits.len(), 2);
    assert!(exits[0].is_some());
    assert!(exits[1].is_none());
}

#[test]
fn hide_then_show_releases_handle_and_resets() {
    let (platform, controller, _) = setup(SimulatedPlatform::new());
    controller.begin_session().unwrap();
    controller.toggle_mute();
    let session_id = controller.snapshot().session_id;
    let tracks = platform.issued_tracks();

    controller.set_visible(false);
    assert!(tracks.iter().all(|t| !t.is_live()));
    assert_eq!(controller.snapshot().screen, LiveScreen::Hidden);

    controller.set_visible(true);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.camera, PermissionState::Idle);
    assert_eq!(snapshot.microphone, PermissionState::Idle);
    assert_eq!(snapshot.screen, LiveScreen::PermissionPrompt);
    assert!(!snapshot.has_handle);
    assert!(!snapshot.muted);
    assert_ne!(snapshot.session_id, session_id);
    assert!(platform.live_tracks().is_empty());
}

#[test]
fn showing_clears_a_previous_denial() {
    let (_, controller, _) = setup(SimulatedPlatform::with_devices(devices::without_camera()));
    controller.begin_session().unwrap();
    assert_eq!(controller.snapshot().camera, PermissionState::Denied);

    controller.set_visible(false);
    controller.set_visible(true);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.camera, PermissionState::Idle);
    assert_eq!(snapshot.failure, None);
    assert_eq!(snapshot.error_message, None);
}

#[test]
fn concurrent_acquisitions_are_rejected() {
    let gate = RequestGate::new();
    let platform = SimulatedPlatform::new();
    platform.install_gate(Arc::clone(&gate));
    let (platform, controller, _) = setup(platform);
    let controller = Arc::new(controller);

    let worker = {
        let controller = Arc::clone(&controller);
        thread::spawn(move || controller.begin_session())
    };
    assert!(gate.wait_until_entered(1, Duration::from_secs(5)));

    let snapshot = controller.snapshot();
    assert!(snapshot.acquiring);
    assert_eq!(snapshot.camera, PermissionState::Requesting);
    assert_eq!(controller.begin_session(), Err(SessionError::AcquisitionInFlight));
    assert_eq!(controller.flip_camera(), Err(SessionError::AcquisitionInFlight));
    assert_eq!(controller.retry(), Err(SessionError::AcquisitionInFlight));

    gate.open();
    worker.join().unwrap().unwrap();

    assert_eq!(controller.snapshot().camera, PermissionState::Granted);
    assert!(!controller.snapshot().acquiring);
    assert_eq!(platform.requests().len(), 1);
}

#[test]
fn hiding_during_acquisition_discards_late_handle() {
    let gate = RequestGate::new();
    let platform = SimulatedPlatform::new();
    platform.install_gate(Arc::clone(&gate));
    let (platform, controller, recorder) = setup(platform);
    let controller = Arc::new(controller);

    let worker = {
        let controller = Arc::clone(&controller);
        thread::spawn(move || controller.begin_session())
    };
    assert!(gate.wait_until_entered(1, Duration::from_secs(5)));

    controller.set_visible(false);
    gate.open();
    worker.join().unwrap().unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.camera, PermissionState::Idle);
    assert!(!snapshot.has_handle);
    assert_eq!(platform.issued_tracks().len(), 2);
    assert!(platform.live_tracks().is_empty());
    assert_all_consistent(&recorder);
}

#[test]
fn dropping_controller_releases_devices() {
    let (platform, controller, _) = setup(SimulatedPlatform::new());
    controller.begin_session().unwrap();
    assert_eq!(platform.open_streams(), 1);

    drop(controller);

    assert_eq!(platform.open_streams(), 0);
}

#[test]
fn works_through_the_live_session_trait() {
    let (_, controller, _) = setup(SimulatedPlatform::new());
    let session: &dyn LiveSession = &controller;

    session.begin_session().unwrap();
    assert!(session.toggle_mute());
    session.flip_camera().unwrap();
    assert!(session.end_session().is_some());
    assert_eq!(session.snapshot().camera, PermissionState::Idle);
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = SessionConfiguration {
        ideal_height: 0,
        ..Default::default()
    };
    let result = LiveSessionController::new(Arc::new(SimulatedPlatform::new()), config);

    assert!(matches!(result, Err(SessionError::ConfigurationFailed(_))));
}
