//! Blocking gate for media requests.
//!
//! Lets a test hold an acquisition "in flight" on one thread while it
//! drives the controller from another.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct GateState {
    open: bool,
    entered: usize,
}

#[derive(Default)]
pub struct RequestGate {
    state: Mutex<GateState>,
    cond: Condvar,
}

impl RequestGate {
    /// A new, closed gate.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Block the calling request until the gate is opened.
    pub fn pass(&self) {
        let mut s = self.state.lock();
        s.entered += 1;
        self.cond.notify_all();
        while !s.open {
            self.cond.wait(&mut s);
        }
    }

    /// Wait until `count` requests have reached the gate. Returns false on timeout.
    pub fn wait_until_entered(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut s = self.state.lock();
        while s.entered < count {
            if self.cond.wait_until(&mut s, deadline).timed_out() {
                return s.entered >= count;
            }
        }
        true
    }

    pub fn open(&self) {
        self.state.lock().open = true;
        self.cond.notify_all();
    }

    pub fn entered(&self) -> usize {
        self.state.lock().entered
    }
}
