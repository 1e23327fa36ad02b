//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Start (controller.rs):
//!     Validate settings → Notify subsystems → Initialize storage → Spawn listener
//!     → wait for the listener outcome
//!
//! Pause / Resume (controller.rs):
//!     Transition table (state.rs) → Notify subsystems (notifier.rs) → Callback (callbacks.rs)
//!
//! Shutdown (controller.rs):
//!     Pause → Persist recovery → Close listener within grace → Stop console (shutdown.rs)
//!     → Notify stopped → Callback
//! ```
//!
//! # Design Decisions
//! - One enumerated state and a transition table instead of flags
//! - A fatal listener outcome pauses the server before `start` returns it
//! - The console is the only background task besides the listener

pub mod callbacks;
pub mod console;
pub mod controller;
pub mod notifier;
pub mod shutdown;
pub mod state;

pub use callbacks::{CallbackRegistry, ConnectHook, LifecycleEvent, LifecycleHook};
pub use controller::{Server, ServerBuilder};
pub use notifier::SubsystemNotifier;
pub use shutdown::{ShutdownListener, ShutdownSignal};
pub use state::{ServerState, Step, Transition};
