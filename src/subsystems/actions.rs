//! Built-in scripted action runner lifecycle.

use crate::subsystems::run_flags::RunFlags;
use crate::subsystems::traits::Subsystem;

/// Gate for client-invoked scripted actions. Actions are refused unless the
/// server is running.
#[derive(Debug, Default)]
pub struct ActionRunner {
    run: RunFlags,
}

impl ActionRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admits_actions(&self) -> bool {
        self.run.is_active()
    }
}

impl Subsystem for ActionRunner {
    fn name(&self) -> &'static str {
        "actions"
    }

    fn set_server_started(&self, started: bool) {
        self.run.set_started(started);
    }

    fn pause(&self) {
        self.run.pause();
    }

    fn resume(&self) {
        self.run.resume();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_follow_pause() {
        let actions = ActionRunner::new();
        actions.set_server_started(true);
        assert!(actions.admits_actions());
        actions.pause();
        assert!(!actions.admits_actions());
        actions.resume();
        assert!(actions.admits_actions());
    }
}
