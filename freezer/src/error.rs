use cfgfreeze_artifact::ArtifactError;
use cfgfreeze_bootstrap::BootstrapError;
use cfgfreeze_source::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreezeError {
    /// The configuration source could not be opened or read.
    #[error("freeze: {0}")]
    Input(#[source] SourceError),

    /// The configuration source failed to evaluate.
    #[error("freeze: invalid configuration: {0}")]
    Load(#[source] SourceError),

    /// The configured attribute could not be extracted.
    #[error("freeze: {0}")]
    Attribute(#[source] SourceError),

    #[error("freeze: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("freeze: {0}")]
    Artifact(#[from] ArtifactError),
}

impl FreezeError {
    /// Sorts an error from [`ConfigProvider::load`](cfgfreeze_source::ConfigProvider::load).
    pub(crate) fn from_load(err: SourceError) -> Self {
        match err {
            SourceError::Io { .. } => FreezeError::Input(err),
            err if err.is_load_error() => FreezeError::Load(err),
            err => FreezeError::Attribute(err),
        }
    }
}
