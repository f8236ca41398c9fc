//! Platform adapters

pub mod console;
pub mod discord;

pub use console::{ConsoleResponder, ConsoleTransport};
pub use discord::DiscordRest;
