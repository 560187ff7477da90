use thiserror::Error;

use crate::value::ObjectId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("graph: attribute not found: {0}")]
    NotFound(String),

    #[error("graph: not an object: {0}")]
    NotAnObject(String),

    #[error("graph: dangling reference to object {0}")]
    DanglingRef(ObjectId),

    #[error("graph: invalid attribute path: {0:?}")]
    InvalidPath(String),

    #[error("graph: render error: {0}")]
    Render(String),
}
