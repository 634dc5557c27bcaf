//! Application-level orchestration utilities.
//!
//! This module owns the request lifecycle (spawning fetches and delivering their outcomes)
//! and post-success processing such as exports. UI/CLI layers call into this module to keep
//! responsibilities separated.

mod controller;
mod post_process;

pub(crate) use controller::{run_controller, UiCommand};
pub(crate) use post_process::process_assessment;
