//! Built-in slash commands

pub mod utility;

use crate::domain::entities::CommandCategory;
use crate::infrastructure::plugins::StaticManifest;

/// Add the built-in commands to `manifest`
pub fn install(manifest: StaticManifest) -> StaticManifest {
    manifest
        .command(CommandCategory::Utility, utility::ping::command)
        .command(CommandCategory::Utility, utility::help::command)
}
