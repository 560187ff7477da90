use std::path::Path;

use cfgfreeze_graph::ObjectGraph;
use tracing::debug;

use crate::descriptor::Descriptor;
use crate::error::BootstrapError;

/// Reads a bootstrap file, loads its artifact and applies its mutations.
///
/// Accepts both the YAML descriptor and the legacy Python bootstrap. The
/// artifact path is opened exactly as recorded, so relative paths resolve
/// against the current directory.
pub fn thaw(bootstrap: &Path) -> Result<ObjectGraph, BootstrapError> {
    let text = std::fs::read_to_string(bootstrap).map_err(|source| BootstrapError::Io {
        path: bootstrap.to_path_buf(),
        source,
    })?;
    let descriptor = Descriptor::parse(&text)?;
    debug!(
        artifact = %descriptor.artifact,
        mutations = descriptor.mutations.len(),
        "thawing"
    );
    descriptor.load()
}
