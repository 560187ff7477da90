//! Bootstrap files for frozen configurations.
//!
//! The bootstrap is the file a job actually receives. It points at the
//! paired artifact and lists the assignments applied after loading it:
//!
//! ```yaml
//! artifact: job.py.pkl
//! mutations:
//! - path: RandomNumberGeneratorService.externalLHEProducer.initialSeed
//!   value: 100
//! ```
//!
//! [`EmitFormat::Python`] writes the same content as a four-line Python
//! script instead. [`thaw`] reads either form back.

mod descriptor;
mod error;
mod loader;
mod render;

pub use descriptor::{Descriptor, Literal, Mutation, SEED_PATH, SEED_VALUE};
pub use error::BootstrapError;
pub use loader::thaw;
pub use render::{EmitFormat, Framework, PYTHON_TEMPLATE, render, write_bootstrap};
