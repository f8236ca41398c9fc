//! Application services - Handler loading and bot lifecycle

pub mod lifecycle;
pub mod loader;

pub use lifecycle::{exit_status, Bot, BotSettings};
pub use loader::HandlerLoader;
