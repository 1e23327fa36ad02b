//! Narrow views of the settings handed to collaborators.

use std::fmt;

use crate::config::ServerSettings;

/// The settings fields subsystems act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsProjection {
    pub server_name: String,
    pub kick_dup_on_login: bool,
    pub multi_connect: bool,
    pub room_delete_on_leave: bool,
    pub user_room_control: bool,
    pub storage_enabled: bool,
    pub remember_me: bool,
}

impl SettingsProjection {
    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self {
            server_name: settings.server_name.clone(),
            kick_dup_on_login: settings.access.kick_dup_on_login,
            multi_connect: settings.access.multi_connect,
            room_delete_on_leave: settings.rooms.room_delete_on_leave,
            user_room_control: settings.rooms.user_room_control,
            storage_enabled: settings.storage.enabled,
            remember_me: settings.storage.remember_me,
        }
    }
}

/// Connection parameters passed to `StorageManager::initialize`.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageCredentials {
    pub ip: String,
    pub port: u16,
    pub protocol: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub encryption_cost: u32,
    pub remember_me: bool,
    pub custom_login_column: String,
}

impl StorageCredentials {
    pub fn from_settings(settings: &ServerSettings) -> Self {
        let storage = &settings.storage;
        Self {
            ip: storage.ip.clone(),
            port: storage.port,
            protocol: storage.protocol.clone(),
            user: storage.user.clone(),
            password: storage.password.clone(),
            database: storage.database.clone(),
            encryption_cost: storage.encryption_cost,
            remember_me: storage.remember_me,
            custom_login_column: storage.custom_login_column.clone(),
        }
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("ip", &self.ip)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("encryption_cost", &self.encryption_cost)
            .field("remember_me", &self.remember_me)
            .field("custom_login_column", &self.custom_login_column)
            .finish()
    }
}
