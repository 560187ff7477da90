//! Rendering an [`ObjectGraph`] back to YAML.
//!
//! Objects with a class become tagged mappings (`!Class {..}`). An object
//! reached a second time, including through a cycle, is written as
//! `!ref <path>` where the path is the attribute path of its first
//! occurrence, prefixed with the name given for the root.

use std::collections::HashMap;

use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value as Yaml};

use crate::error::GraphError;
use crate::graph::ObjectGraph;
use crate::value::{ObjectId, Value};

/// Tag used for object references.
pub const REF_TAG: &str = "ref";

impl ObjectGraph {
    /// Renders the graph root as a YAML value.
    pub fn to_yaml(&self, root_name: &str) -> Result<Yaml, GraphError> {
        let mut renderer = Renderer {
            graph: self,
            seen: HashMap::new(),
        };
        renderer.render(self.root(), root_name)
    }

    /// Renders the graph as a single-entry mapping `{root_name: root}`.
    ///
    /// The result is a valid configuration source defining `root_name`.
    pub fn to_yaml_module(&self, root_name: &str) -> Result<Yaml, GraphError> {
        let mut module = Mapping::new();
        module.insert(Yaml::String(root_name.to_string()), self.to_yaml(root_name)?);
        Ok(Yaml::Mapping(module))
    }

    /// Renders the graph as YAML text, see [`ObjectGraph::to_yaml_module`].
    pub fn to_yaml_string(&self, root_name: &str) -> Result<String, GraphError> {
        let doc = self.to_yaml_module(root_name)?;
        serde_yaml::to_string(&doc).map_err(|e| GraphError::Render(e.to_string()))
    }
}

struct Renderer<'a> {
    graph: &'a ObjectGraph,
    seen: HashMap<ObjectId, String>,
}

impl Renderer<'_> {
    fn render(&mut self, value: &Value, path: &str) -> Result<Yaml, GraphError> {
        Ok(match value {
            Value::Null => Yaml::Null,
            Value::Bool(b) => Yaml::Bool(*b),
            Value::Int(n) => Yaml::Number((*n).into()),
            Value::Float(n) => Yaml::Number((*n).into()),
            Value::Str(s) => Yaml::String(s.clone()),
            Value::Seq(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(self.render(item, &format!("{path}.{i}"))?);
                }
                Yaml::Sequence(out)
            }
            Value::Tagged(t) => tagged(&t.tag, self.render(&t.value, path)?),
            Value::Object(id) => self.render_object(*id, path)?,
        })
    }

    fn render_object(&mut self, id: ObjectId, path: &str) -> Result<Yaml, GraphError> {
        if let Some(first) = self.seen.get(&id) {
            return Ok(tagged(REF_TAG, Yaml::String(first.clone())));
        }
        self.seen.insert(id, path.to_string());

        let obj = self.graph.get(id)?;
        let mut mapping = Mapping::new();
        for (name, v) in &obj.fields {
            let rendered = self.render(v, &format!("{path}.{name}"))?;
            mapping.insert(Yaml::String(name.clone()), rendered);
        }
        Ok(match &obj.class {
            Some(class) => tagged(class, Yaml::Mapping(mapping)),
            None => Yaml::Mapping(mapping),
        })
    }
}

fn tagged(tag: &str, value: Yaml) -> Yaml {
    Yaml::Tagged(Box::new(TaggedValue {
        tag: Tag::new(tag),
        value,
    }))
}
