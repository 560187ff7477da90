use std::path::PathBuf;

use cfgfreeze_graph::GraphError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("source: cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{}: {message}", .path.display())]
    Eval { path: PathBuf, message: String },

    #[error("module '{module}' has no attribute '{attr}'")]
    MissingAttribute { module: String, attr: String },

    #[error("source: build failed: {0}")]
    Build(String),

    #[error("source: {0}")]
    Graph(#[from] GraphError),
}

impl SourceError {
    pub(crate) fn eval(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        SourceError::Eval {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the error happened while evaluating the configuration itself,
    /// as opposed to opening it or looking up an attribute afterwards.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            SourceError::Syntax { .. } | SourceError::Eval { .. } | SourceError::Build(_)
        )
    }
}
