//! Configuration providers.
//!
//! A [`ConfigProvider`] produces a [`ConfigModule`]: a namespace of
//! module-level attributes backed by an object graph. Two providers are
//! included:
//!
//! - [`SourceProvider`] evaluates a YAML configuration source in a sandbox
//!   (see [`eval`] for the tags it understands).
//! - [`FnProvider`] wraps a build function written in Rust.

pub mod error;
pub mod eval;
pub mod module;
pub mod provider;

pub use error::SourceError;
pub use eval::INCLUDE_TAG;
pub use module::{ConfigModule, MODULE_CLASS};
pub use provider::{ConfigProvider, FnProvider, SourceProvider, evaluate_reader};
