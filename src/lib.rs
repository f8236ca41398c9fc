//! Pingu Bot - slash command host
//!
//! Commands and events are listed in a static manifest, published to the
//! remote command catalog on startup and dispatched from the transport's
//! event stream with per-user cooldowns and failure isolation.

pub mod application;
pub mod commands;
pub mod domain;
pub mod events;
pub mod infrastructure;

use infrastructure::plugins::StaticManifest;

/// Manifest with every built-in command and event handler
pub fn manifest() -> StaticManifest {
    events::install(commands::install(StaticManifest::new()))
}
