use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SourceError;
use crate::eval;
use crate::module::ConfigModule;

/// Something that can produce a configuration module.
pub trait ConfigProvider {
    fn load(&self) -> Result<ConfigModule, SourceError>;
}

/// Provider backed by a build function.
pub struct FnProvider<F> {
    build: F,
}

impl<F> FnProvider<F>
where
    F: Fn() -> Result<ConfigModule, SourceError>,
{
    pub fn new(build: F) -> Self {
        Self { build }
    }
}

impl<F> ConfigProvider for FnProvider<F>
where
    F: Fn() -> Result<ConfigModule, SourceError>,
{
    fn load(&self) -> Result<ConfigModule, SourceError> {
        (self.build)()
    }
}

/// Provider that evaluates a YAML configuration source file.
#[derive(Debug, Clone)]
pub struct SourceProvider {
    path: PathBuf,
    name: String,
}

impl SourceProvider {
    /// Creates a provider for `path`. The module is named after the file stem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config".to_string());
        Self { path, name }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ConfigProvider for SourceProvider {
    fn load(&self) -> Result<ConfigModule, SourceError> {
        let io_err = |source| SourceError::Io {
            path: self.path.clone(),
            source,
        };
        let file = File::open(&self.path).map_err(io_err)?;
        let sandbox = self
            .path
            .canonicalize()
            .map_err(io_err)?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        debug!(path = %self.path.display(), "loading configuration source");
        evaluate_reader(&self.name, file, &self.path, &sandbox)
    }
}

/// Reads a whole configuration source from `reader` and evaluates it.
///
/// The reader is dropped, closing any underlying handle, before evaluation
/// starts, so it is released on every exit path.
pub fn evaluate_reader<R: Read>(
    name: &str,
    mut reader: R,
    origin: &Path,
    sandbox: &Path,
) -> Result<ConfigModule, SourceError> {
    let mut text = String::new();
    let read = reader.read_to_string(&mut text);
    drop(reader);
    read.map_err(|source| SourceError::Io {
        path: origin.to_path_buf(),
        source,
    })?;
    eval::evaluate(name, &text, origin, sandbox)
}
