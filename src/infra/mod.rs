//! Infrastructure layer
//!
//! Handles all I/O operations: network, filesystem, archives, external
//! processes and host probing.

pub mod archive;
pub mod download;
pub mod filesystem;
pub mod platform;
pub mod process;
