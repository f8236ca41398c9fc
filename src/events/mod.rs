//! Built-in gateway event handlers

pub mod interaction_create;
pub mod ready;

use crate::infrastructure::plugins::StaticManifest;

/// Add the built-in event subscriptions to `manifest`
pub fn install(manifest: StaticManifest) -> StaticManifest {
    manifest
        .event(ready::descriptor)
        .event(interaction_create::descriptor)
}
