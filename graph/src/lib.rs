//! Configuration object graph.
//!
//! A frozen configuration is an [`ObjectGraph`]: an arena of [`Object`]s
//! (class name plus ordered attributes) and a root [`Value`]. Values are
//! scalars, sequences, type-tagged values or references to objects, which is
//! enough to represent shared and cyclic configuration structures with a
//! plain serde derive.
//!
//! # Example
//!
//! ```rust
//! use cfgfreeze_graph::{AttrPath, Object, ObjectGraph, Value};
//!
//! let mut graph = ObjectGraph::new();
//! let seed = graph.alloc(
//!     Object::with_class("PSet").with_attr("initialSeed", Value::tagged("uint32", Value::Int(7))),
//! );
//! let process = graph.alloc(Object::with_class("Process").with_attr("generator", seed));
//! graph.set_root(Value::Object(process));
//!
//! let path: AttrPath = "generator.initialSeed".parse().unwrap();
//! graph.assign(&path, Value::Int(100)).unwrap();
//! assert_eq!(graph.lookup(&path).unwrap().as_int(), Some(100));
//! ```

pub mod error;
pub mod graph;
pub mod object;
pub mod path;
pub mod value;
pub mod yaml;

pub use error::GraphError;
pub use graph::ObjectGraph;
pub use object::Object;
pub use path::AttrPath;
pub use value::{ObjectId, Tagged, Value};
pub use yaml::REF_TAG;

#[cfg(test)]
mod tests;
