use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of an [`Object`](crate::Object) inside an [`ObjectGraph`](crate::ObjectGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A configuration value.
///
/// Scalars and sequences are stored inline. Mappings always live in the
/// object arena and are referenced through [`Value::Object`], which is what
/// lets a configuration share sub-objects or contain cycles.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Value>),
    /// A scalar or sequence annotated with a framework type, e.g. `uint32`.
    Tagged(Box<Tagged>),
    Object(ObjectId),
}

/// Framework type tag attached to a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tagged {
    pub tag: String,
    pub value: Value,
}

impl Value {
    pub fn tagged(tag: impl Into<String>, value: Value) -> Self {
        Value::Tagged(Box::new(Tagged {
            tag: tag.into(),
            value,
        }))
    }

    pub fn is_tagged(&self) -> bool {
        matches!(self, Value::Tagged(_))
    }

    /// Returns the referenced object, if this value is an object reference.
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the value with any type tag stripped.
    pub fn untagged(&self) -> &Value {
        match self {
            Value::Tagged(t) => t.value.untagged(),
            other => other,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Value::Tagged(t) => Some(t.tag.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.untagged() {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.untagged() {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.untagged() {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.untagged() {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self.untagged() {
            Value::Seq(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Short name of the value kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Tagged(_) => "tagged",
            Value::Object(_) => "object",
        }
    }

    /// Calls `f` on every object reference held by this value, in order.
    pub fn for_each_ref(&self, f: &mut impl FnMut(ObjectId)) {
        match self {
            Value::Object(id) => f(*id),
            Value::Seq(items) => {
                for item in items {
                    item.for_each_ref(f);
                }
            }
            Value::Tagged(t) => t.value.for_each_ref(f),
            _ => {}
        }
    }

    /// Mutable counterpart of [`Value::for_each_ref`].
    pub fn for_each_ref_mut(&mut self, f: &mut impl FnMut(&mut ObjectId)) {
        match self {
            Value::Object(id) => f(id),
            Value::Seq(items) => {
                for item in items {
                    item.for_each_ref_mut(f);
                }
            }
            Value::Tagged(t) => t.value.for_each_ref_mut(f),
            _ => {}
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}
