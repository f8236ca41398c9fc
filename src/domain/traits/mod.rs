//! Domain traits - Abstractions for infrastructure implementations

pub mod handler;
pub mod publisher;
pub mod source;
pub mod transport;

pub use handler::{CommandContext, CommandHandler, EventHandler};
pub use publisher::CommandPublisher;
pub use source::{HandlerEnv, HandlerSource};
pub use transport::{Activity, InteractionResponder, Transport};
