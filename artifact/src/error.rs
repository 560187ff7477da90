use std::path::PathBuf;

use cfgfreeze_graph::GraphError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("artifact: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact: encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("artifact: decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("artifact: corrupt object graph: {0}")]
    Corrupt(#[from] GraphError),
}
