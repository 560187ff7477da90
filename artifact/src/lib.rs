//! Frozen configuration artifacts.
//!
//! An artifact is an [`ObjectGraph`] encoded as MessagePack with named
//! fields. It sits next to its bootstrap file, at the bootstrap path with
//! [`ARTIFACT_SUFFIX`] appended.

mod error;

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cfgfreeze_graph::ObjectGraph;
use tracing::debug;

pub use error::ArtifactError;

/// Suffix appended to the bootstrap path to name the artifact.
pub const ARTIFACT_SUFFIX: &str = ".pkl";

/// Returns the artifact path paired with `output`.
///
/// This is plain string concatenation: `out.py` becomes `out.py.pkl` and
/// `dir/job` becomes `dir/job.pkl`.
pub fn artifact_path_for(output: &Path) -> PathBuf {
    let mut s = OsString::from(output.as_os_str());
    s.push(ARTIFACT_SUFFIX);
    PathBuf::from(s)
}

/// Encodes a graph to bytes.
pub fn encode(graph: &ObjectGraph) -> Result<Vec<u8>, ArtifactError> {
    Ok(rmp_serde::to_vec_named(graph)?)
}

/// Decodes a graph from bytes and checks that its references are intact.
pub fn decode(data: &[u8]) -> Result<ObjectGraph, ArtifactError> {
    let graph: ObjectGraph = rmp_serde::from_slice(data)?;
    graph.validate()?;
    Ok(graph)
}

/// Writes `graph` to `path`, replacing any existing file.
pub fn write_artifact(path: &Path, graph: &ObjectGraph) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    rmp_serde::encode::write_named(&mut writer, graph)?;
    writer.flush().map_err(io_err)?;
    debug!(path = %path.display(), objects = graph.len(), "wrote artifact");
    Ok(())
}

/// Reads an artifact written by [`write_artifact`].
pub fn read_artifact(path: &Path) -> Result<ObjectGraph, ArtifactError> {
    let data = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&data)
}
