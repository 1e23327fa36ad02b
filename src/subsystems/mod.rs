//! Collaborator subsystems.
//!
//! # Data Flow
//! ```text
//! LifecycleController
//!     → SubsystemNotifier (fixed order)
//!         → sessions → rooms → actions → storage
//!
//! Upgrade endpoint
//!     → SessionManager::attach (one task per connection)
//! ```
//!
//! # Design Decisions
//! - Collaborators are trait objects; the built-in ones let the binary run standalone
//! - Each collaborator receives a settings projection, never the whole snapshot
//! - Storage and recovery have no built-in implementation

pub mod actions;
pub mod projection;
pub mod rooms;
pub mod run_flags;
pub mod sessions;
pub mod traits;

pub use actions::ActionRunner;
pub use projection::{SettingsProjection, StorageCredentials};
pub use rooms::RoomDirectory;
pub use sessions::{SessionId, SessionRegistry};
pub use traits::{RecoveryError, SessionManager, StateRecovery, StorageError, StorageManager, Subsystem};
