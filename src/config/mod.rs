//! Configuration constants
//!
//! Compiled-in defaults and upstream locations. User overrides are resolved
//! in [`crate::core::settings`].

pub mod defaults;
pub mod urls;
