//! Install steps
//!
//! Each step checks its marker first and only acts when the marker is
//! missing. `Err` from a step is fatal; tolerated failures come back as
//! warnings inside the [`StepReport`](crate::core::step::StepReport).

pub mod cmdline_tools;
pub mod flutter;
pub mod native_toolchain;
pub mod prerequisites;
pub mod sdk_packages;
