//! Built-in room directory lifecycle.
//!
//! Holds the room-control policy and the run flags room logic consults.
//! Rooms and their variables stay in memory across a pause.

use std::sync::{PoisonError, RwLock};

use crate::subsystems::projection::SettingsProjection;
use crate::subsystems::run_flags::RunFlags;
use crate::subsystems::traits::Subsystem;

/// Room-control policy received at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPolicy {
    /// Owner of server-created private rooms.
    pub server_name: String,
    pub user_room_control: bool,
    pub delete_on_leave: bool,
}

#[derive(Debug, Default)]
pub struct RoomDirectory {
    run: RunFlags,
    policy: RwLock<Option<RoomPolicy>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(&self) -> Option<RoomPolicy> {
        self.policy.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Whether a user may create a room right now.
    pub fn allows_user_rooms(&self) -> bool {
        self.run.is_active()
            && self
                .policy()
                .map(|policy| policy.user_room_control)
                .unwrap_or(false)
    }
}

impl Subsystem for RoomDirectory {
    fn name(&self) -> &'static str {
        "rooms"
    }

    fn apply_settings(&self, settings: &SettingsProjection) {
        let policy = RoomPolicy {
            server_name: settings.server_name.clone(),
            user_room_control: settings.user_room_control,
            delete_on_leave: settings.room_delete_on_leave,
        };
        *self.policy.write().unwrap_or_else(PoisonError::into_inner) = Some(policy);
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
