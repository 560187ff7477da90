use std::path::PathBuf;

use cfgfreeze_artifact::ArtifactError;
use cfgfreeze_graph::GraphError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("bootstrap: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bootstrap: invalid descriptor: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("bootstrap: invalid legacy bootstrap: {0}")]
    Legacy(String),

    #[error("bootstrap: render error: {0}")]
    Render(#[from] minijinja::Error),

    #[error("bootstrap: path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("bootstrap: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("bootstrap: cannot set {path}: {source}")]
    Mutation {
        path: String,
        #[source]
        source: GraphError,
    },
}
