//! Application layer - Use cases and orchestration
//!
//! This layer contains:
//! - Errors: Domain-specific errors
//! - Messaging: Cooldowns, event fan-out, interaction dispatch
//! - Services: Handler loading and the bot lifecycle

pub mod errors;
pub mod messaging;
pub mod services;
