//! YAML source evaluation.
//!
//! Tags understood by the evaluator:
//!
//! - `!ref a.b.c`: reference to the object at that attribute path, resolved
//!   from the namespace of the file the reference appears in. References are
//!   linked after the whole source has been read, so they may point forward
//!   and may form cycles.
//! - `!include other.yaml`: evaluate another file as a nested module. The
//!   path is relative to the including file and must stay inside the
//!   directory of the top-level source.
//! - `!Name {..}` on a mapping: an object of class `Name`.
//! - `!tag value` on anything else: a [`Value::Tagged`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cfgfreeze_graph::{AttrPath, Object, ObjectGraph, ObjectId, REF_TAG, Value};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value as Yaml};
use tracing::debug;

use crate::error::SourceError;
use crate::module::{ConfigModule, MODULE_CLASS};

/// Tag used for nested module includes.
pub const INCLUDE_TAG: &str = "include";

/// Evaluates `text` as a configuration module.
///
/// `origin` names the source in diagnostics; `sandbox` is the directory
/// includes are resolved against and may not leave.
pub fn evaluate(
    name: &str,
    text: &str,
    origin: &Path,
    sandbox: &Path,
) -> Result<ConfigModule, SourceError> {
    let sandbox = sandbox
        .canonicalize()
        .unwrap_or_else(|_| sandbox.to_path_buf());
    let mut evaluator = Evaluator::new(sandbox.clone());
    if let Ok(canonical) = origin.canonicalize() {
        evaluator.stack.push(canonical);
    }

    let namespace = evaluator.eval_module(text, origin, sandbox)?;
    evaluator.link()?;

    let graph = evaluator.graph.extract(&Value::Object(namespace))?;
    let namespace = graph.root_object()?;
    debug!(module = name, objects = graph.len(), "evaluated configuration source");
    Ok(ConfigModule::new(name, graph, namespace))
}

#[derive(Debug, Clone)]
struct Scope {
    namespace: ObjectId,
    file: PathBuf,
    dir: PathBuf,
}

#[derive(Debug, Clone)]
struct PendingRef {
    scope: ObjectId,
    path: AttrPath,
    file: PathBuf,
}

struct Evaluator {
    graph: ObjectGraph,
    sandbox: PathBuf,
    /// Canonical paths of the files currently being evaluated.
    stack: Vec<PathBuf>,
    /// Placeholder object id -> reference it stands for.
    refs: HashMap<ObjectId, PendingRef>,
}

impl Evaluator {
    fn new(sandbox: PathBuf) -> Self {
        Self {
            graph: ObjectGraph::new(),
            sandbox,
            stack: Vec::new(),
            refs: HashMap::new(),
        }
    }

    fn eval_module(&mut self, text: &str, origin: &Path, dir: PathBuf) -> Result<ObjectId, SourceError> {
        let mut doc: Yaml = serde_yaml::from_str(text).map_err(|source| SourceError::Syntax {
            path: origin.to_path_buf(),
            source,
        })?;
        doc.apply_merge().map_err(|source| SourceError::Syntax {
            path: origin.to_path_buf(),
            source,
        })?;

        let mapping = match doc {
            Yaml::Mapping(m) => m,
            Yaml::Null => Mapping::new(),
            other => {
                return Err(SourceError::eval(
                    origin,
                    format!("top level must be a mapping, found {}", yaml_kind(&other)),
                ));
            }
        };

        let namespace = self.graph.alloc(Object::with_class(MODULE_CLASS));
        let scope = Scope {
            namespace,
            file: origin.to_path_buf(),
            dir,
        };
        self.fill_object(namespace, mapping, &scope)?;
        Ok(namespace)
    }

    fn fill_object(&mut self, id: ObjectId, mapping: Mapping, scope: &Scope) -> Result<(), SourceError> {
        for (key, node) in mapping {
            let name = match key {
                Yaml::String(s) => s,
                other => {
                    return Err(SourceError::eval(
                        &scope.file,
                        format!("attribute names must be strings, found {}", yaml_kind(&other)),
                    ));
                }
            };
            let value = self.eval_value(node, scope)?;
            self.graph.get_mut(id)?.set_attr(name, value);
        }
        Ok(())
    }

    fn eval_value(&mut self, node: Yaml, scope: &Scope) -> Result<Value, SourceError> {
        Ok(match node {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => Value::Bool(b),
            Yaml::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if n.is_u64() {
                    return Err(SourceError::eval(
                        &scope.file,
                        format!("integer {n} does not fit in 64 signed bits"),
                    ));
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Yaml::String(s) => Value::Str(s),
            Yaml::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.eval_value(item, scope)?);
                }
                Value::Seq(out)
            }
            Yaml::Mapping(m) => {
                let id = self.graph.alloc(Object::new());
                self.fill_object(id, m, scope)?;
                Value::Object(id)
            }
            Yaml::Tagged(t) => self.eval_tagged(*t, scope)?,
        })
    }

    fn eval_tagged(&mut self, tagged: TaggedValue, scope: &Scope) -> Result<Value, SourceError> {
        let tag = tag_name(&tagged.tag);
        match tag.as_str() {
            REF_TAG => {
                let Yaml::String(target) = tagged.value else {
                    return Err(SourceError::eval(&scope.file, "!ref expects an attribute path"));
                };
                let path = AttrPath::parse(&target)
                    .map_err(|e| SourceError::eval(&scope.file, format!("!ref {target}: {e}")))?;
                let placeholder = self.graph.alloc(Object::new());
                self.refs.insert(
                    placeholder,
                    PendingRef {
                        scope: scope.namespace,
                        path,
                        file: scope.file.clone(),
                    },
                );
                Ok(Value::Object(placeholder))
            }
            INCLUDE_TAG => {
                let Yaml::String(target) = tagged.value else {
                    return Err(SourceError::eval(&scope.file, "!include expects a file path"));
                };
                Ok(Value::Object(self.include(&target, scope)?))
            }
            _ => match tagged.value {
                Yaml::Mapping(m) => {
                    let id = self.graph.alloc(Object::with_class(tag));
                    self.fill_object(id, m, scope)?;
                    Ok(Value::Object(id))
                }
                other => Ok(Value::tagged(tag, self.eval_value(other, scope)?)),
            },
        }
    }

    fn include(&mut self, target: &str, scope: &Scope) -> Result<ObjectId, SourceError> {
        let candidate = scope.dir.join(target);
        let canonical = candidate.canonicalize().map_err(|e| {
            SourceError::eval(&scope.file, format!("cannot include {target}: {e}"))
        })?;
        if !canonical.starts_with(&self.sandbox) {
            return Err(SourceError::eval(
                &scope.file,
                format!(
                    "include {target} is outside {}",
                    self.sandbox.display()
                ),
            ));
        }
        if self.stack.contains(&canonical) {
            return Err(SourceError::eval(
                &scope.file,
                format!("circular include of {}", canonical.display()),
            ));
        }

        let text = std::fs::read_to_string(&canonical).map_err(|e| {
            SourceError::eval(&scope.file, format!("cannot include {target}: {e}"))
        })?;
        debug!(file = %canonical.display(), "including configuration source");

        let dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.sandbox.clone());
        self.stack.push(canonical.clone());
        let result = self.eval_module(&text, &canonical, dir);
        self.stack.pop();
        result
    }

    /// Resolves every pending reference and rewrites placeholders to their
    /// targets. Placeholders become unreachable and are dropped by the final
    /// extraction.
    fn link(&mut self) -> Result<(), SourceError> {
        let mut resolved: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut placeholders: Vec<ObjectId> = self.refs.keys().copied().collect();
        placeholders.sort();
        for placeholder in placeholders {
            let mut visiting = Vec::new();
            self.resolve(placeholder, &mut visiting, &mut resolved)?;
        }
        self.graph.rewrite_refs(|id| {
            if let Some(target) = resolved.get(&*id) {
                *id = *target;
            }
        });
        Ok(())
    }

    fn resolve(
        &self,
        placeholder: ObjectId,
        visiting: &mut Vec<ObjectId>,
        resolved: &mut HashMap<ObjectId, ObjectId>,
    ) -> Result<ObjectId, SourceError> {
        if let Some(target) = resolved.get(&placeholder) {
            return Ok(*target);
        }
        let Some(pending) = self.refs.get(&placeholder) else {
            return Ok(placeholder);
        };
        if visiting.contains(&placeholder) {
            return Err(SourceError::eval(
                &pending.file,
                format!("!ref {} refers back to itself", pending.path),
            ));
        }
        visiting.push(placeholder);

        let mut current = Value::Object(pending.scope);
        for (i, seg) in pending.path.segments().iter().enumerate() {
            let next = match self.graph.child(&current, seg) {
                Ok(Some(v)) => v.clone(),
                Ok(None) => {
                    return Err(SourceError::eval(
                        &pending.file,
                        format!(
                            "!ref {}: no attribute {}",
                            pending.path,
                            pending.path.prefix(i + 1)
                        ),
                    ));
                }
                Err(_) => {
                    return Err(SourceError::eval(
                        &pending.file,
                        format!(
                            "!ref {}: {} is a {}, not an object",
                            pending.path,
                            pending.path.prefix(i),
                            current.kind()
                        ),
                    ));
                }
            };
            current = match next {
                Value::Object(id) => Value::Object(self.resolve(id, visiting, resolved)?),
                other => other,
            };
        }

        let target = current.as_object().ok_or_else(|| {
            SourceError::eval(
                &pending.file,
                format!(
                    "!ref {} must name an object, found {}",
                    pending.path,
                    current.kind()
                ),
            )
        })?;
        visiting.pop();
        resolved.insert(placeholder, target);
        Ok(target)
    }
}

fn tag_name(tag: &Tag) -> String {
    let s = tag.to_string();
    match s.strip_prefix('!') {
        Some(stripped) => stripped.to_string(),
        None => s,
    }
}

fn yaml_kind(value: &Yaml) -> &'static str {
    match value {
        Yaml::Null => "null",
        Yaml::Bool(_) => "bool",
        Yaml::Number(_) => "number",
        Yaml::String(_) => "string",
        Yaml::Sequence(_) => "sequence",
        Yaml::Mapping(_) => "mapping",
        Yaml::Tagged(_) => "tagged value",
    }
}
