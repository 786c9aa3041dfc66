//! # live-session-sim
//!
//! Simulated media platform backend for live-session-core.
//!
//! Provides:
//! - `SimulatedPlatform` — scripted device list, permission store, request failures
//!   and exclusive camera access
//! - `SimulatedTrack` — inspectable capture track
//! - `RequestGate` — holds media requests in flight for concurrency tests
//! - `devices` — device presets (laptop, phone, missing camera/microphone)
//!
//! ## Usage
//! ```
//! use std::sync::Arc;
//! use live_session_core::{LiveSessionController, SessionConfiguration};
//! use live_session_sim::SimulatedPlatform;
//!
//! let platform = Arc::new(SimulatedPlatform::new());
//! let controller =
//!     LiveSessionController::new(Arc::clone(&platform), SessionConfiguration::default()).unwrap();
//! controller.set_visible(true);
//! controller.begin_session().unwrap();
//! assert!(controller.snapshot().has_handle);
//! ```

pub mod devices;
pub mod gate;
pub mod permissions;
pub mod platform;
pub mod track;

pub use gate::RequestGate;
pub use permissions::PermissionProfile;
pub use platform::{ScriptedFailure, SimulatedPlatform, SimulationProfile};
pub use track::SimulatedTrack;
