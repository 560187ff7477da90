//! Settings for the cfgfreeze CLI tools.
//!
//! Settings are stored in ~/.cfgfreeze/{app_name}/config.yaml. Every field is
//! optional, and a missing file means defaults.

use std::path::{Path, PathBuf};

use cfgfreeze_bootstrap::{EmitFormat, Framework};
use serde::{Deserialize, Serialize};

use crate::paths::Paths;

/// CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bootstrap format written by `freeze-config`.
    pub emit: EmitFormat,

    /// Module imported by the Python bootstrap.
    pub framework_module: String,

    /// Alias the framework module is imported as.
    pub framework_alias: String,

    /// Path the settings were read from (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let framework = Framework::default();
        Self {
            emit: EmitFormat::default(),
            framework_module: framework.module,
            framework_alias: framework.alias,
            config_path: PathBuf::new(),
        }
    }
}

impl Settings {
    /// Gets the default settings file path.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Paths::new(app_name).ok().map(|p| p.config_file())
    }

    /// Returns the settings file path. Empty for built-in defaults.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Framework imported by the Python bootstrap.
    pub fn framework(&self) -> Framework {
        Framework {
            module: self.framework_module.clone(),
            alias: self.framework_alias.clone(),
        }
    }
}

/// Loads settings for the specified app.
///
/// A missing default file yields defaults and nothing is created. A missing
/// `custom_path` is an error.
pub fn load_settings(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Settings> {
    let (config_path, required) = match custom_path {
        Some(p) => (PathBuf::from(p), true),
        None => match Settings::default_config_path(app_name) {
            Some(p) => (p, false),
            None => return Ok(Settings::default()),
        },
    };

    if !config_path.exists() {
        if required {
            anyhow::bail!("config file '{}' not found", config_path.display());
        }
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(&config_path)?;
    let mut settings: Settings = if content.trim().is_empty() {
        Settings::default()
    } else {
        serde_yaml::from_str(&content)?
    };
    settings.config_path = config_path;
    Ok(settings)
}
