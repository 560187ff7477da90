use cfgfreeze_graph::{ObjectGraph, ObjectId, Value};

use crate::error::SourceError;

/// Class given to module namespace objects.
pub const MODULE_CLASS: &str = "Module";

/// The result of evaluating a configuration source: a namespace object whose
/// attributes are the module-level definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigModule {
    name: String,
    graph: ObjectGraph,
    namespace: ObjectId,
}

impl ConfigModule {
    pub fn new(name: impl Into<String>, graph: ObjectGraph, namespace: ObjectId) -> Self {
        Self {
            name: name.into(),
            graph,
            namespace,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    pub fn namespace(&self) -> ObjectId {
        self.namespace
    }

    /// Module-level attribute names, in definition order.
    pub fn attr_names(&self) -> Vec<&str> {
        match self.graph.get(self.namespace) {
            Ok(ns) => ns.fields.iter().map(|(k, _)| k.as_str()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Looks up a module-level attribute.
    pub fn attr(&self, name: &str) -> Result<&Value, SourceError> {
        self.graph
            .get(self.namespace)?
            .attr(name)
            .ok_or_else(|| SourceError::MissingAttribute {
                module: self.name.clone(),
                attr: name.to_string(),
            })
    }

    /// Looks up a module-level attribute and copies everything reachable from
    /// it into a standalone graph rooted at that value.
    pub fn extract(&self, name: &str) -> Result<ObjectGraph, SourceError> {
        let value = self.attr(name)?;
        Ok(self.graph.extract(value)?)
    }
}
