//! Event handling - cooldowns, event fan-out and interaction dispatch

pub mod cooldown;
pub mod dispatcher;
pub mod emitter;

pub use cooldown::{CooldownStatus, CooldownTracker};
pub use dispatcher::{DispatchOutcome, InteractionDispatcher};
pub use emitter::{EventEmitter, EventError};

/// Text of a caught panic payload
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
