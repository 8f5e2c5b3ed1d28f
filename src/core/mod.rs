//! Install engine
//!
//! - [`settings`] - Override file parsing and resolved configuration
//! - [`layout`] - Paths under the tooling root
//! - [`step`] - Step outcomes, warnings, events and the shared context
//! - [`steps`] - The individual install steps
//! - [`orchestrator`] - Runs the steps in order

pub mod layout;
pub mod orchestrator;
pub mod settings;
pub mod step;
pub mod steps;
