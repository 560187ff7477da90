//! Freezes a configuration source.
//!
//! [`freeze`] evaluates a configuration source, takes its `process`
//! attribute and writes two files: the bootstrap at the output path and the
//! artifact next to it (see [`artifact_path_for`]). Progress goes to stdout
//! so an operator can copy the final `transfer_input_files` line into a
//! submit file.

mod error;

use std::path::{Path, PathBuf};

use cfgfreeze_artifact::{artifact_path_for, write_artifact};
use cfgfreeze_bootstrap::{EmitFormat, Framework, write_bootstrap};
use cfgfreeze_source::{ConfigProvider, SourceProvider};
use tracing::{debug, info};

pub use error::FreezeError;

/// Module attribute holding the configuration.
pub const PROCESS_ATTR: &str = "process";

/// Prefix of the diagnostic printed when the source fails to evaluate.
pub const LOAD_ERROR_PREFIX: &str = "Your config file is not valid: ";

#[derive(Debug, Clone, Default)]
pub struct FreezeOptions {
    pub emit: EmitFormat,
    pub framework: Framework,
}

/// The pair of files written by a successful freeze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreezeOutput {
    pub bootstrap: PathBuf,
    pub artifact: PathBuf,
}

impl FreezeOutput {
    /// Operator instruction naming both files.
    pub fn transfer_message(&self) -> String {
        format!(
            "Done!  You will need to add 'transfer_input_files = {}, {}' to your Condor submit file.",
            self.bootstrap.display(),
            self.artifact.display()
        )
    }
}

/// Freezes the configuration source at `config_path` into `output_path`.
pub fn freeze(
    config_path: &Path,
    output_path: &Path,
    opts: &FreezeOptions,
) -> Result<FreezeOutput, FreezeError> {
    println!("Importing file {}", config_path.display());
    freeze_with(&SourceProvider::new(config_path), output_path, opts)
}

/// Freezes the configuration produced by `provider` into `output_path`.
///
/// Files are written in a fixed order, bootstrap first. A failure while
/// writing the artifact leaves the bootstrap behind; callers discard both
/// files on error.
pub fn freeze_with<P: ConfigProvider + ?Sized>(
    provider: &P,
    output_path: &Path,
    opts: &FreezeOptions,
) -> Result<FreezeOutput, FreezeError> {
    let module = provider.load().map_err(|e| {
        let err = FreezeError::from_load(e);
        if let FreezeError::Load(source) = &err {
            println!("{LOAD_ERROR_PREFIX}{source}");
        }
        err
    })?;
    debug!(module = module.name(), attrs = ?module.attr_names(), "configuration loaded");

    let process = module
        .extract(PROCESS_ATTR)
        .map_err(FreezeError::Attribute)?;
    debug!(objects = process.len(), "extracted {PROCESS_ATTR}");

    let artifact = artifact_path_for(output_path);

    println!("Writing bootstrap file {}", output_path.display());
    let descriptor = write_bootstrap(output_path, opts.emit, &opts.framework)?;
    debug!(mutations = %descriptor.summary().trim_end(), "bootstrap written");

    println!("Writing data file {}", artifact.display());
    write_artifact(&artifact, &process)?;

    let output = FreezeOutput {
        bootstrap: output_path.to_path_buf(),
        artifact,
    };
    info!(
        bootstrap = %output.bootstrap.display(),
        artifact = %output.artifact.display(),
        "frozen"
    );
    println!("{}", output.transfer_message());
    Ok(output)
}

#[cfg(test)]
mod tests;
