//! Shared status surface.
//!
//! One mutex-guarded snapshot the worker updates at task boundaries and
//! the control server reads for status requests, plus the processing and
//! abort flags that guard re-entrancy.

use blockhand_agent::AbortFlag;
use blockhand_facade::WorldFacade;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// The status document served to callers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusSnapshot {
    pub connected: bool,
    pub position: [f32; 3],
    pub health: f32,
    pub food: f32,
    pub current_action: Option<String>,
    pub processing: bool,
}

/// State shared between the control server and the command worker.
#[derive(Clone, Default)]
pub struct SharedState {
    processing: Arc<AtomicBool>,
    pub abort: AbortFlag,
    status: Arc<Mutex<StatusSnapshot>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the worker for a command. Fails if one is running;
    /// commands are rejected while busy, never queued.
    pub fn try_begin(&self, action: &str) -> bool {
        if self
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        let mut status = self.status.lock().expect("status lock");
        status.processing = true;
        status.current_action = Some(action.to_string());
        true
    }

    pub fn finish(&self) {
        let mut status = self.status.lock().expect("status lock");
        status.processing = false;
        status.current_action = None;
        drop(status);
        self.processing.store(false, Ordering::SeqCst);
        self.abort.clear();
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Refresh the avatar-derived fields from the facade.
    pub fn observe(&self, facade: &dyn WorldFacade, connected: bool) {
        let position = facade.position();
        let mut status = self.status.lock().expect("status lock");
        status.connected = connected;
        status.position = [position.x, position.y, position.z];
        status.health = facade.health();
        status.food = facade.food();
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.status.lock().expect("status lock").clone()
    }
}
