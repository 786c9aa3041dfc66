//! Simulated permission store.
//!
//! Models the platform's remembered grant status. A successful media
//! request promotes `prompt` to `granted`, as a browser remembers consent
//! for the rest of the page's lifetime.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use live_session_core::models::error::PlatformError;
use live_session_core::models::state::{Capability, PlatformPermission};

/// Grant status per capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionProfile {
    pub camera: PlatformPermission,
    pub microphone: PlatformPermission,
}

impl PermissionProfile {
    pub fn get(&self, capability: Capability) -> PlatformPermission {
        match capability {
            Capability::Camera => self.camera,
            Capability::Microphone => self.microphone,
        }
    }

    pub fn set(&mut self, capability: Capability, status: PlatformPermission) {
        match capability {
            Capability::Camera => self.camera = status,
            Capability::Microphone => self.microphone = status,
        }
    }

    pub fn any_denied(&self) -> bool {
        self.camera == PlatformPermission::Denied || self.microphone == PlatformPermission::Denied
    }
}

pub struct PermissionTable {
    profile: Mutex<PermissionProfile>,
    query_supported: bool,
}

impl PermissionTable {
    pub fn new(profile: PermissionProfile, query_supported: bool) -> Self {
        Self {
            profile: Mutex::new(profile),
            query_supported,
        }
    }

    pub fn query(&self, capability: Capability) -> Result<PlatformPermission, PlatformError> {
        if !self.query_supported {
            return Err(PlatformError::NotSupported(format!(
                "permission query for {} is not supported",
                capability
            )));
        }
        Ok(self.profile.lock().get(capability))
    }

    pub fn set(&self, capability: Capability, status: PlatformPermission) {
        self.profile.lock().set(capability, status);
    }

    pub fn snapshot(&self) -> PermissionProfile {
        *self.profile.lock()
    }

    /// Record consent after a successful request.
    pub fn grant_prompted(&self) {
        let mut profile = self.profile.lock();
        for capability in Capability::ALL {
            if profile.get(capability) == PlatformPermission::Prompt {
                profile.set(capability, PlatformPermission::Granted);
            }
        }
    }
}
