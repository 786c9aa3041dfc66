use crate::models::error::SessionError;
use crate::models::session_summary::{SessionSnapshot, SessionSummary};

/// The operations a live view may invoke.
///
/// These are the only mutators of session state.
pub trait LiveSession: Send + Sync {
    fn snapshot(&self) -> SessionSnapshot;

    /// Request camera + microphone. Transitions: idle → requesting → granted/denied.
    fn begin_session(&self) -> Result<(), SessionError>;

    /// Flip the audio tracks' enabled flag. Returns the resulting mute state.
    fn toggle_mute(&self) -> bool;

    /// Swap to the opposite camera, re-acquiring the capture handle.
    fn flip_camera(&self) -> Result<(), SessionError>;

    /// Release the capture handle and ask the view to navigate away.
    fn end_session(&self) -> Option<SessionSummary>;

    /// Return from denied to idle. Transitions: denied → idle.
    fn retry(&self) -> Result<(), SessionError>;

    /// Report a visibility change of the live view.
    fn set_visible(&self, visible: bool);
}
