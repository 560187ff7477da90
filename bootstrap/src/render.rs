//! Bootstrap file rendering.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::{Descriptor, Literal};
use crate::error::BootstrapError;

/// Legacy Python bootstrap. Loads the pickled artifact and applies the
/// mutations as attribute assignments.
pub const PYTHON_TEMPLATE: &str = "import {{ module }} as {{ alias }}
import pickle
process = pickle.load(open({{ artifact }}, 'rb'))
{% for m in mutations -%}
process.{{ m.path }} = {{ m.value }}
{% endfor -%}
";

/// What gets written to the bootstrap path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitFormat {
    /// YAML [`Descriptor`].
    #[default]
    Descriptor,
    /// Four-line Python script for framework-side loading.
    Python,
}

impl fmt::Display for EmitFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitFormat::Descriptor => write!(f, "descriptor"),
            EmitFormat::Python => write!(f, "python"),
        }
    }
}

impl FromStr for EmitFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "descriptor" | "yaml" => Ok(EmitFormat::Descriptor),
            "python" | "py" => Ok(EmitFormat::Python),
            other => Err(format!("unknown emit format: {other}")),
        }
    }
}

/// Framework module imported by the Python bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framework {
    pub module: String,
    pub alias: String,
}

impl Default for Framework {
    fn default() -> Self {
        Self {
            module: "FWCore.ParameterSet.Config".to_string(),
            alias: "cms".to_string(),
        }
    }
}

#[derive(Serialize)]
struct PythonMutation {
    path: String,
    value: String,
}

/// Renders the bootstrap text for `descriptor`.
pub fn render(
    format: EmitFormat,
    descriptor: &Descriptor,
    framework: &Framework,
) -> Result<String, BootstrapError> {
    match format {
        EmitFormat::Descriptor => Ok(serde_yaml::to_string(descriptor)?),
        EmitFormat::Python => {
            let mut env = Environment::new();
            env.add_template("bootstrap.py", PYTHON_TEMPLATE)?;
            let tmpl = env.get_template("bootstrap.py")?;

            let mutations: Vec<PythonMutation> = descriptor
                .mutations
                .iter()
                .map(|m| PythonMutation {
                    path: m.path.clone(),
                    value: m.value.to_python(),
                })
                .collect();
            Ok(tmpl.render(context! {
                module => framework.module,
                alias => framework.alias,
                artifact => Literal::Str(descriptor.artifact.clone()).to_python(),
                mutations => mutations,
            })?)
        }
    }
}

/// Writes the bootstrap for `output` and returns the descriptor it encodes.
///
/// In the Python form the artifact path is a quoted string literal, so
/// quotes and backslashes in `output` are escaped.
pub fn write_bootstrap(
    output: &Path,
    format: EmitFormat,
    framework: &Framework,
) -> Result<Descriptor, BootstrapError> {
    let descriptor = Descriptor::for_output(output)?;
    let text = render(format, &descriptor, framework)?;
    std::fs::write(output, text).map_err(|source| BootstrapError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    debug!(path = %output.display(), format = %format, "wrote bootstrap");
    Ok(descriptor)
}
