//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML) or none
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (per-feature group checks, defaults)
//!     → ValidatedSettings (immutable)
//!     → projections handed to each collaborator subsystem
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once the server starts
//! - All fields have defaults to allow minimal files
//! - Collaborators never see the whole snapshot, only their projection

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, ConfigError};
pub use schema::{
    AccessConfig, AdminConfig, LifecycleConfig, NetworkConfig, ObservabilityConfig,
    RecoveryConfig, RoomControlConfig, ServerSettings, StorageConfig, TlsConfig,
};
pub use validation::{validate, ValidatedSettings, ValidationError};
