//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Platform integrations (Discord REST, console)
//! - Plugins: Handler manifests

pub mod adapters;
pub mod config;
pub mod plugins;
