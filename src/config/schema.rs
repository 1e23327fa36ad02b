//! Configuration schema definitions.
//!
//! This module defines the complete settings structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root settings for the game server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// The server's name. Owns the server-created private rooms.
    pub server_name: String,

    /// Maximum concurrent client connections (0 = unlimited).
    pub max_connections: usize,

    /// Network binding (host names, IP, port).
    pub network: NetworkConfig,

    /// Transport security.
    pub tls: TlsConfig,

    /// Connection and login policy.
    pub access: AccessConfig,

    /// Room-control policy.
    pub rooms: RoomControlConfig,

    /// Storage-backed authentication and friending.
    pub storage: StorageConfig,

    /// Room state recovery across restarts.
    pub recovery: RecoveryConfig,

    /// Administrator tools.
    pub admin: AdminConfig,

    /// Pause/shutdown timing.
    pub lifecycle: LifecycleConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            server_name: "!server!".to_string(),
            max_connections: 0,
            network: NetworkConfig::default(),
            tls: TlsConfig::default(),
            access: AccessConfig::default(),
            rooms: RoomControlConfig::default(),
            storage: StorageConfig::default(),
            recovery: RecoveryConfig::default(),
            admin: AdminConfig::default(),
            lifecycle: LifecycleConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Network binding.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Public host name clients connect to (e.g., "example.com").
    pub host_name: String,

    /// Optional alternate host name (e.g., "www.example.com").
    pub host_alias: String,

    /// IP address or resolvable name to bind to.
    pub ip: String,

    /// Port to bind to.
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host_name: "localhost".to_string(),
            host_alias: "localhost".to_string(),
            ip: "localhost".to_string(),
            port: 8080,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Serve over TLS (and expose the secure upgrade path).
    pub enabled: bool,

    /// Path to certificate file (PEM).
    pub cert_file: String,

    /// Path to private key file (PEM).
    pub private_key_file: String,
}

/// Connection acceptance and login policy.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Decline browser connections whose origin is not this server.
    pub origin_only: bool,

    /// Allow several connections under the same user. Overrides `kick_dup_on_login`.
    pub multi_connect: bool,

    /// Disconnect a logged in user when another logs in with the same name.
    pub kick_dup_on_login: bool,
}

/// Room-control policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoomControlConfig {
    /// Users may create, invite to, and destroy their own rooms.
    pub user_room_control: bool,

    /// Rooms created by a user are deleted when the owner leaves.
    pub room_delete_on_leave: bool,
}

impl Default for RoomControlConfig {
    fn default() -> Self {
        Self {
            user_room_control: true,
            room_delete_on_leave: true,
        }
    }
}

/// Storage (SQL) settings for authentication and friending.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Enable storage-backed features.
    pub enabled: bool,

    /// Database address.
    pub ip: String,

    /// Database port.
    pub port: u16,

    /// Transport protocol used to reach the database ("tcp", "udp").
    pub protocol: String,

    /// Database user name.
    pub user: String,

    /// Database user password.
    pub password: String,

    /// Database name.
    pub database: String,

    /// Password-hashing cost factor (4..=31).
    pub encryption_cost: u32,

    /// Account column used for logging in instead of the name column.
    pub custom_login_column: String,

    /// Enable the "remember me" login feature.
    pub remember_me: bool,

    /// Abort startup when storage initialization fails.
    /// When false the server runs without persistence.
    pub fail_fast: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ip: "localhost".to_string(),
            port: 3306,
            protocol: "tcp".to_string(),
            user: "user".to_string(),
            password: "password".to_string(),
            database: "database".to_string(),
            encryption_cost: 4,
            custom_login_column: String::new(),
            remember_me: false,
            fail_fast: false,
        }
    }
}

/// Recovery of rooms and their state after a restart.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Persist recoverable state on shutdown.
    pub enabled: bool,

    /// Directory holding the recovery data.
    pub location: String,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            location: "./recovery".to_string(),
        }
    }
}

/// Administrator tools configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin tools.
    pub enabled: bool,

    /// Allow administration from outside the origin server.
    pub remote_admin: bool,

    /// Admin login name.
    pub login: String,

    /// Admin password.
    pub password: String,

    /// Read lifecycle commands from stdin while running.
    pub console: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            remote_admin: false,
            // WARNING: This is a placeholder! Change this in production.
            login: "admin".to_string(),
            password: "password".to_string(),
            console: false,
        }
    }
}

/// Pause/shutdown timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Time in-flight connections get to finish after a shutdown request, in seconds.
    pub grace_period_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
