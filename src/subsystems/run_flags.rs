//! Started/paused flags shared by the built-in subsystems.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct RunFlags {
    started: AtomicBool,
    paused: AtomicBool,
}

impl RunFlags {
    pub fn set_started(&self, started: bool) {
        self.started.store(started, Ordering::SeqCst);
        if !started {
            self.paused.store(false, Ordering::SeqCst);
        }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Started and not paused.
    pub fn is_active(&self) -> bool {
        self.is_started() && !self.is_paused()
    }
}
