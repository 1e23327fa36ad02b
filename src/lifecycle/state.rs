//! Server state machine.
//!
//! # States
//! - Stopped: nothing running, settings may change
//! - Running: listener up, sessions admitted
//! - Paused: listener up, sessions refused, in-memory state kept
//! - Stopping: shutdown in progress
//!
//! # State Transitions
//! ```text
//! Stopped  --Start-->    Running
//! Running  --Pause-->    Paused
//! Paused   --Resume-->   Running
//! Running  --ShutDown--> Stopping
//! Paused   --ShutDown--> Stopping
//! Stopping --Finish-->   Stopped
//! ```
//!
//! Repeating a transition that has already happened (Pause while Paused,
//! ShutDown while Stopped) is ignored. Starting a server that is not
//! stopped is rejected.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerState {
    #[default]
    Stopped,
    Running,
    Paused,
    Stopping,
}

/// Lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Pause,
    Resume,
    ShutDown,
    /// Shutdown finished.
    Finish,
}

/// Result of applying a transition to a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Move to the given state.
    Enter(ServerState),
    /// No-op.
    Ignore,
    /// Illegal from this state.
    Reject,
}

impl ServerState {
    pub fn step(self, transition: Transition) -> Step {
        use ServerState::*;
        use Transition::*;

        match (self, transition) {
            (Stopped, Start) => Step::Enter(Running),
            (_, Start) => Step::Reject,

            (Running, Pause) => Step::Enter(Paused),
            (_, Pause) => Step::Ignore,

            (Paused, Resume) => Step::Enter(Running),
            (_, Resume) => Step::Ignore,

            (Running | Paused, ShutDown) => Step::Enter(Stopping),
            (Stopped | Stopping, ShutDown) => Step::Ignore,

            (Stopping, Finish) => Step::Enter(Stopped),
            (Stopped, Finish) => Step::Ignore,
            (Running | Paused, Finish) => Step::Reject,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServerState::Stopped => "stopped",
            ServerState::Running => "running",
            ServerState::Paused => "paused",
            ServerState::Stopping => "stopping",
        }
    }

    /// Numeric form for the state gauge.
    pub fn as_gauge(self) -> f64 {
        match self {
            ServerState::Stopped => 0.0,
            ServerState::Running => 1.0,
            ServerState::Paused => 2.0,
            ServerState::Stopping => 3.0,
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ServerState::*;
    use super::Transition::*;
    use super::*;

    #[test]
    fn start_only_from_stopped() {
        assert_eq!(Stopped.step(Start), Step::Enter(Running));
        for state in [Running, Paused, Stopping] {
            assert_eq!(state.step(Start), Step::Reject);
        }
    }

    #[test]
    fn pause_is_idempotent() {
        assert_eq!(Running.step(Pause), Step::Enter(Paused));
        assert_eq!(Paused.step(Pause), Step::Ignore);
        assert_eq!(Stopped.step(Pause), Step::Ignore);
        assert_eq!(Stopping.step(Pause), Step::Ignore);
    }

    #[test]
    fn resume_only_from_paused() {
        assert_eq!(Paused.step(Resume), Step::Enter(Running));
        for state in [Stopped, Running, Stopping] {
            assert_eq!(state.step(Resume), Step::Ignore);
        }
    }

    #[test]
    fn shutdown_reaches_stopped_from_any_live_state() {
        for state in [Running, Paused] {
            assert_eq!(state.step(ShutDown), Step::Enter(Stopping));
        }
        assert_eq!(Stopping.step(Finish), Step::Enter(Stopped));
        assert_eq!(Stopped.step(ShutDown), Step::Ignore);
        assert_eq!(Stopping.step(ShutDown), Step::Ignore);
    }

    #[test]
    fn finish_requires_stopping() {
        assert_eq!(Running.step(Finish), Step::Reject);
        assert_eq!(Paused.step(Finish), Step::Reject);
    }

    #[test]
    fn default_is_stopped() {
        assert_eq!(ServerState::default(), Stopped);
        assert_eq!(Stopped.to_string(), "stopped");
    }
}
