use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::object::Object;
use crate::path::AttrPath;
use crate::value::{ObjectId, Value};

/// An arena of objects plus the value the graph is rooted at.
///
/// Objects refer to each other through [`ObjectId`]s, so shared
/// sub-objects and reference cycles are representable without any special
/// handling in the serializer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectGraph {
    objects: Vec<Object>,
    root: Value,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object to the arena and returns its id.
    pub fn alloc(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    pub fn get(&self, id: ObjectId) -> Result<&Object, GraphError> {
        self.objects
            .get(id.index())
            .ok_or(GraphError::DanglingRef(id))
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Result<&mut Object, GraphError> {
        self.objects
            .get_mut(id.index())
            .ok_or(GraphError::DanglingRef(id))
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn set_root(&mut self, root: Value) {
        self.root = root;
    }

    /// Returns the root object id, failing if the root is not an object.
    pub fn root_object(&self) -> Result<ObjectId, GraphError> {
        self.root
            .as_object()
            .ok_or_else(|| GraphError::NotAnObject(ROOT.to_string()))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, obj)| (ObjectId(i as u32), obj))
    }

    /// Looks up a single path segment below `value`.
    ///
    /// Objects are searched by attribute name, sequences by numeric index.
    /// Returns `Ok(None)` when the segment does not exist.
    pub fn child<'a>(
        &'a self,
        value: &'a Value,
        segment: &str,
    ) -> Result<Option<&'a Value>, GraphError> {
        match value.untagged() {
            Value::Object(id) => Ok(self.get(*id)?.attr(segment)),
            Value::Seq(items) => Ok(segment.parse::<usize>().ok().and_then(|i| items.get(i))),
            other => Err(GraphError::NotAnObject(other.kind().to_string())),
        }
    }

    /// Walks `path` starting at `from`.
    pub fn resolve<'a>(&'a self, from: &'a Value, path: &AttrPath) -> Result<&'a Value, GraphError> {
        self.resolve_segments(from, path.segments())
    }

    /// Walks `path` starting at the graph root.
    pub fn lookup(&self, path: &AttrPath) -> Result<&Value, GraphError> {
        self.resolve_segments(&self.root, path.segments())
    }

    fn resolve_segments<'a>(
        &'a self,
        from: &'a Value,
        segments: &[String],
    ) -> Result<&'a Value, GraphError> {
        let mut current = from;
        for (i, seg) in segments.iter().enumerate() {
            current = match self.child(current, seg) {
                Ok(Some(v)) => v,
                Ok(None) => return Err(GraphError::NotFound(join_prefix(segments, i + 1))),
                Err(GraphError::NotAnObject(_)) => {
                    return Err(GraphError::NotAnObject(join_prefix(segments, i)));
                }
                Err(e) => return Err(e),
            };
        }
        Ok(current)
    }

    /// Assigns `value` to the attribute at `path`, relative to the root.
    ///
    /// Every segment but the last must already exist; the last one must name
    /// an attribute of an object and is created if missing. Assigning an
    /// untagged value over a tagged one keeps the existing tag. Returns the
    /// previous value of the attribute.
    pub fn assign(&mut self, path: &AttrPath, value: Value) -> Result<Option<Value>, GraphError> {
        let (parent, leaf) = path.split_last();
        let root = self.root.clone();
        let holder = self
            .resolve_segments(&root, parent)?
            .as_object()
            .ok_or_else(|| GraphError::NotAnObject(display_prefix(parent)))?;

        let obj = self.get_mut(holder)?;
        if !obj.has_attr(leaf) {
            obj.set_attr(leaf, value);
            return Ok(None);
        }
        let slot = obj
            .attr_mut(leaf)
            .ok_or_else(|| GraphError::NotFound(path.to_string()))?;
        if let Value::Tagged(tagged) = &mut *slot {
            if !value.is_tagged() {
                let previous = Value::Tagged(tagged.clone());
                tagged.value = value;
                return Ok(Some(previous));
            }
        }
        Ok(Some(std::mem::replace(slot, value)))
    }

    /// Copies the part of the graph reachable from `root` into a new graph.
    ///
    /// Objects are renumbered in depth-first, field-order visiting order, so
    /// extracting equal graphs always yields identical arenas.
    pub fn extract(&self, root: &Value) -> Result<ObjectGraph, GraphError> {
        let mut remap: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut order: Vec<ObjectId> = Vec::new();
        let mut stack: Vec<ObjectId> = Vec::new();

        push_children(root, &mut stack);
        while let Some(id) = stack.pop() {
            if remap.contains_key(&id) {
                continue;
            }
            let obj = self.get(id)?;
            remap.insert(id, ObjectId(order.len() as u32));
            order.push(id);
            let mut children = Vec::new();
            for (_, v) in &obj.fields {
                v.for_each_ref(&mut |c| children.push(c));
            }
            stack.extend(children.into_iter().rev());
        }

        let mut objects = Vec::with_capacity(order.len());
        for id in order {
            let mut obj = self.get(id)?.clone();
            for (_, v) in obj.fields.iter_mut() {
                v.for_each_ref_mut(&mut |r| *r = remap[&*r]);
            }
            objects.push(obj);
        }

        let mut root = root.clone();
        root.for_each_ref_mut(&mut |r| *r = remap[&*r]);

        Ok(ObjectGraph { objects, root })
    }

    /// Calls `f` on every object reference in the graph, root included.
    pub fn rewrite_refs(&mut self, mut f: impl FnMut(&mut ObjectId)) {
        self.root.for_each_ref_mut(&mut f);
        for obj in self.objects.iter_mut() {
            for (_, v) in obj.fields.iter_mut() {
                v.for_each_ref_mut(&mut f);
            }
        }
    }

    /// Checks that every reference in the graph points into the arena.
    pub fn validate(&self) -> Result<(), GraphError> {
        let len = self.objects.len();
        let mut dangling = None;
        let mut check = |id: ObjectId| {
            if id.index() >= len && dangling.is_none() {
                dangling = Some(id);
            }
        };
        self.root.for_each_ref(&mut check);
        for obj in &self.objects {
            for (_, v) in &obj.fields {
                v.for_each_ref(&mut check);
            }
        }
        match dangling {
            Some(id) => Err(GraphError::DanglingRef(id)),
            None => Ok(()),
        }
    }
}

const ROOT: &str = "<root>";

fn join_prefix(segments: &[String], n: usize) -> String {
    display_prefix(&segments[..n])
}

fn display_prefix(segments: &[String]) -> String {
    if segments.is_empty() {
        ROOT.to_string()
    } else {
        segments.join(".")
    }
}

fn push_children(value: &Value, stack: &mut Vec<ObjectId>) {
    let mut children = Vec::new();
    value.for_each_ref(&mut |id| children.push(id));
    stack.extend(children.into_iter().rev());
}
