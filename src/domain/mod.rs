//! Domain layer - Core bot model
//!
//! This layer contains:
//! - Entities: Commands, events, interactions, users
//! - Traits: Abstractions for infrastructure (Transport, handlers, publisher)

pub mod entities;
pub mod traits;
