//! Bootstrap descriptors.
//!
//! A descriptor names the artifact to load and the mutations to apply after
//! loading it. It is normally stored as YAML; the four-line Python bootstrap
//! produced by [`EmitFormat::Python`](crate::EmitFormat::Python) parses to the
//! same descriptor.

use std::fmt::Write as _;
use std::path::Path;

use cfgfreeze_artifact::{artifact_path_for, read_artifact};
use cfgfreeze_graph::{AttrPath, ObjectGraph, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BootstrapError;

/// Attribute path of the seed reset on every reload.
pub const SEED_PATH: &str = "RandomNumberGeneratorService.externalLHEProducer.initialSeed";

/// Value the seed is reset to.
pub const SEED_VALUE: i64 = 100;

/// A scalar assigned by a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Literal {
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(n) => Value::Int(*n),
            Literal::Float(n) => Value::Float(*n),
            Literal::Str(s) => Value::Str(s.clone()),
        }
    }

    /// Python source spelling of the literal.
    pub fn to_python(&self) -> String {
        match self {
            Literal::Bool(true) => "True".to_string(),
            Literal::Bool(false) => "False".to_string(),
            Literal::Int(n) => n.to_string(),
            Literal::Float(n) if n.is_nan() => "float('nan')".to_string(),
            Literal::Float(n) if n.is_infinite() => {
                if *n > 0.0 {
                    "float('inf')".to_string()
                } else {
                    "float('-inf')".to_string()
                }
            }
            Literal::Float(n) => format!("{n:?}"),
            Literal::Str(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('\'');
                for c in s.chars() {
                    match c {
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '\n' => out.push_str("\\n"),
                        c => out.push(c),
                    }
                }
                out.push('\'');
                out
            }
        }
    }

    /// Parses a Python literal as written by [`Literal::to_python`].
    fn from_python(s: &str) -> Option<Literal> {
        let s = s.trim();
        match s {
            "True" => return Some(Literal::Bool(true)),
            "False" => return Some(Literal::Bool(false)),
            "float('nan')" => return Some(Literal::Float(f64::NAN)),
            "float('inf')" => return Some(Literal::Float(f64::INFINITY)),
            "float('-inf')" => return Some(Literal::Float(f64::NEG_INFINITY)),
            _ => {}
        }
        if let Ok(n) = s.parse::<i64>() {
            return Some(Literal::Int(n));
        }
        if let Ok(n) = s.parse::<f64>() {
            return Some(Literal::Float(n));
        }
        let inner = s.strip_prefix('\'')?.strip_suffix('\'')?;
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next()? {
                    'n' => out.push('\n'),
                    other => out.push(other),
                }
            } else {
                out.push(c);
            }
        }
        Some(Literal::Str(out))
    }
}

/// Assignment applied to the configuration after it is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// Attribute path relative to the configuration root.
    pub path: String,
    pub value: Literal,
}

impl Mutation {
    pub fn new(path: impl Into<String>, value: Literal) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    /// The fixed seed reset carried by every bootstrap.
    pub fn seed() -> Self {
        Self::new(SEED_PATH, Literal::Int(SEED_VALUE))
    }

    pub fn apply(&self, graph: &mut ObjectGraph) -> Result<(), BootstrapError> {
        let err = |source| BootstrapError::Mutation {
            path: self.path.clone(),
            source,
        };
        let path = AttrPath::parse(&self.path).map_err(err)?;
        graph.assign(&path, self.value.to_value()).map_err(err)?;
        debug!(path = %self.path, "applied mutation");
        Ok(())
    }
}

/// Declarative bootstrap: artifact location plus post-load mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Artifact path exactly as it is opened by the loader.
    pub artifact: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mutations: Vec<Mutation>,
}

impl Descriptor {
    /// The descriptor written next to `output`: its paired artifact and the
    /// seed reset.
    pub fn for_output(output: &Path) -> Result<Self, BootstrapError> {
        let artifact = artifact_path_for(output);
        let artifact = artifact
            .to_str()
            .ok_or_else(|| BootstrapError::NonUtf8Path(artifact.clone()))?
            .to_string();
        Ok(Self {
            artifact,
            mutations: vec![Mutation::seed()],
        })
    }

    /// Parses either a YAML descriptor or a legacy Python bootstrap.
    pub fn parse(text: &str) -> Result<Self, BootstrapError> {
        let first = text.lines().map(str::trim).find(|l| !l.is_empty());
        if first.is_some_and(|l| l.starts_with("import ")) {
            return Self::parse_python(text);
        }
        Ok(serde_yaml::from_str(text)?)
    }

    fn parse_python(text: &str) -> Result<Self, BootstrapError> {
        static LOAD_LINE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^process = pickle\.load\(open\(('.*'), 'rb'\)\)$").unwrap()
        });
        static SET_LINE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^process\.([A-Za-z_][A-Za-z0-9_.]*) = (.+)$").unwrap());

        let mut artifact = None;
        let mut mutations = Vec::new();
        for line in text.lines().map(str::trim_end) {
            if let Some(caps) = LOAD_LINE.captures(line) {
                match Literal::from_python(&caps[1]) {
                    Some(Literal::Str(path)) => artifact = Some(path),
                    _ => {
                        return Err(BootstrapError::Legacy(format!(
                            "bad artifact path in {line:?}"
                        )));
                    }
                }
            } else if let Some(caps) = SET_LINE.captures(line) {
                let value = Literal::from_python(&caps[2]).ok_or_else(|| {
                    BootstrapError::Legacy(format!("unsupported value in {line:?}"))
                })?;
                mutations.push(Mutation::new(&caps[1], value));
            } else if !(line.is_empty() || line.starts_with("import ")) {
                return Err(BootstrapError::Legacy(format!("unexpected line {line:?}")));
            }
        }

        let artifact = artifact
            .ok_or_else(|| BootstrapError::Legacy("no artifact load statement".to_string()))?;
        Ok(Self {
            artifact,
            mutations,
        })
    }

    /// Reads the artifact and applies the mutations in order.
    pub fn load(&self) -> Result<ObjectGraph, BootstrapError> {
        let mut graph = read_artifact(Path::new(&self.artifact))?;
        self.apply(&mut graph)?;
        Ok(graph)
    }

    pub fn apply(&self, graph: &mut ObjectGraph) -> Result<(), BootstrapError> {
        for mutation in &self.mutations {
            mutation.apply(graph)?;
        }
        Ok(())
    }

    /// One line per mutation, `path = value`, for logs and summaries.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for m in &self.mutations {
            let _ = writeln!(out, "{} = {}", m.path, m.value.to_python());
        }
        out
    }
}
