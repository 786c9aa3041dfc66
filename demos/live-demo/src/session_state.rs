use std::io::Write;

use parking_lot::Mutex;
use serde::Serialize;

use live_session_core::{SessionDelegate, SessionFailure, SessionSnapshot, SessionSummary};

/// SessionDelegate that writes every event as one JSON line.
pub struct JsonLinesDelegate<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesDelegate<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn with_output<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        let out = self.out.lock();
        f(&*out)
    }

    pub fn emit<T: Serialize>(&self, event: &str, payload: T) {
        let line = Event { event, payload };
        let mut out = self.out.lock();
        let written = serde_json::to_writer(&mut *out, &line)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(out));
        if let Err(e) = written {
            log::error!("Failed to write {} event: {}", event, e);
        }
    }
}

// -- Event payloads --

#[derive(Serialize)]
struct Event<'a, T> {
    event: &'a str,
    payload: T,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedPayload {
    pub step: String,
    pub message: String,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExitPayload<'a> {
    summary: Option<&'a SessionSummary>,
}

impl<W: Write + Send> SessionDelegate for JsonLinesDelegate<W> {
    fn on_state_changed(&self, snapshot: &SessionSnapshot) {
        self.emit("live://state-changed", snapshot);
    }

    fn on_failure(&self, failure: &SessionFailure) {
        self.emit("live://failure", failure);
    }

    fn on_exit_requested(&self, summary: Option<&SessionSummary>) {
        self.emit("live://exit-requested", ExitPayload { summary });
    }
}
