//! Handler manifests
//!
//! Commands and events are registered from an explicit table rather than
//! loaded from shared libraries or scanned from disk.

pub mod manifest;

pub use manifest::{CommandFactory, EventFactory, StaticManifest};
