//! CLI utilities for cfgfreeze.
//!
//! This crate provides the settings file, output and logging helpers shared
//! by the `freeze-config` and `thaw-config` binaries.

pub mod config;
pub mod logging;
pub mod output;
pub mod paths;

pub use config::{Settings, load_settings};
pub use logging::init_logging;
pub use output::{Output, OutputFormat};
pub use paths::Paths;
