use std::io::Write;
use std::sync::Arc;

use serde::Deserialize;

use live_session_core::{LiveSession, LiveSessionController, SessionConfiguration, SessionError};
use live_session_sim::{SimulatedPlatform, SimulationProfile};

use crate::session_state::{JsonLinesDelegate, RejectedPayload};

/// Scenario run when no file is given: grant, mute, flip, leave.
pub const DEFAULT_SCENARIO: &str = r#"{
    "platform": { "devices": [
        { "deviceId": "cam-front", "label": "Front Camera", "kind": "videoinput" },
        { "deviceId": "cam-back", "label": "Back Camera", "kind": "videoinput" },
        { "deviceId": "mic", "label": "Microphone", "kind": "audioinput" }
    ] },
    "steps": ["show", "begin", "mute", "flip", "mute", "end", "hide"]
}"#;

/// A scripted run loaded from JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scenario {
    pub log_level: Option<String>,
    pub config: SessionConfiguration,
    pub platform: SimulationProfile,
    pub steps: Vec<Step>,
}

/// One user or view event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Show,
    Hide,
    Begin,
    Mute,
    Flip,
    End,
    Retry,
}

impl Step {
    fn apply(self, session: &dyn LiveSession) -> Result<(), SessionError> {
        match self {
            Step::Show => session.set_visible(true),
            Step::Hide => session.set_visible(false),
            Step::Begin => session.begin_session()?,
            Step::Mute => {
                session.toggle_mute();
            }
            Step::Flip => session.flip_camera()?,
            Step::End => {
                session.end_session();
            }
            Step::Retry => session.retry()?,
        }
        Ok(())
    }
}

pub fn parse_scenario(json: &str) -> Result<Scenario, serde_json::Error> {
    serde_json::from_str(json)
}

/// Run every step against a simulated platform, writing events to `out`.
///
/// Rejected steps are reported as events and do not stop the run.
/// Returns the number of rejected steps.
pub fn run_scenario<W: Write + Send + 'static>(
    scenario: &Scenario,
    out: Arc<JsonLinesDelegate<W>>,
) -> Result<usize, SessionError> {
    let platform = SimulatedPlatform::from_profile(&scenario.platform);
    let mut controller = LiveSessionController::new(platform, scenario.config.clone())?;
    controller.set_delegate(out.clone());

    let mut rejected = 0;
    for step in &scenario.steps {
        log::debug!("Step: {:?}", step);
        if let Err(e) = step.apply(&controller) {
            log::warn!("Step {:?} rejected: {}", step, e);
            out.emit(
                "live://rejected",
                RejectedPayload {
                    step: format!("{:?}", step).to_lowercase(),
                    message: e.to_string(),
                },
            );
            rejected += 1;
        }
    }
    Ok(rejected)
}
