//! Application-level orchestration utilities.
//!
//! This module owns run lifecycle control (start/stop/restart) for a single
//! visualizer instance. Presentation layers send commands in and consume the
//! event stream; they never touch the engine directly.

mod controller;

pub(crate) use controller::{run_controller, UiCommand};
