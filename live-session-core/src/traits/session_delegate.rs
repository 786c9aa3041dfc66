use crate::models::failure::SessionFailure;
use crate::models::session_summary::{SessionSnapshot, SessionSummary};

/// Event delegate for live session notifications.
///
/// Called on whichever thread invoked the controller operation, after the
/// controller's internal lock has been released.
pub trait SessionDelegate: Send + Sync {
    /// Called whenever the rendered state changes.
    fn on_state_changed(&self, snapshot: &SessionSnapshot);

    /// Called when an acquisition attempt fails.
    fn on_failure(&self, failure: &SessionFailure);

    /// Called when the user ends the session; the view should navigate away.
    /// `summary` is present when a capture handle was released.
    fn on_exit_requested(&self, summary: Option<&SessionSummary>);
}
