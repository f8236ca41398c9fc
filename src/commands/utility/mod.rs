//! Utility commands

pub mod help;
pub mod ping;
