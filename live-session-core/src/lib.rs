//! # live-session-core
//!
//! Platform-agnostic controller for a live camera + microphone session.
//!
//! Drives camera/microphone authorization, owns the single capture handle,
//! classifies platform failures into user-facing messages, and releases
//! devices deterministically on exit or visibility change. Platform
//! backends implement the `MediaPlatform` trait and plug into the generic
//! `LiveSessionController`.
//!
//! ## Architecture
//!
//! ```text
//! live-session-core (this crate)
//! ├── traits/       ← MediaPlatform, MediaTrack, SessionDelegate, LiveSession
//! ├── models/       ← PermissionState, FailureReason, SessionConfiguration, FacingMode, etc.
//! └── session/      ← LiveSessionController, CaptureHandle
//! ```

pub mod models;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::{AudioConstraints, MediaConstraints, SessionConfiguration, VideoConstraints};
pub use models::error::{PlatformError, SessionError};
pub use models::failure::{AcquisitionStage, FailureReason, SessionFailure};
pub use models::media_models::{DeviceKind, FacingMode, MediaDevice, TrackKind, TrackState};
pub use models::session_summary::{SessionSnapshot, SessionSummary};
pub use models::state::{Capability, LiveScreen, PermissionState, PlatformPermission};
pub use session::controller::LiveSessionController;
pub use session::handle::CaptureHandle;
pub use traits::live_session::LiveSession;
pub use traits::media_platform::{MediaPlatform, MediaTrack};
pub use traits::session_delegate::SessionDelegate;
