use thiserror::Error;

/// Failures while decoding fault trees or expressions from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Unrecognized fault tree node type `{0}`")]
    UnknownNodeType(String),
    #[error("Unrecognized expression type `{0}`")]
    UnknownExpressionType(String),
    #[error("{node} node is missing required field `{field}`")]
    MissingField {
        node: &'static str,
        field: &'static str,
    },
    #[error("{node} node has an invalid `{field}` field: {reason}")]
    InvalidField {
        node: &'static str,
        field: String,
        reason: String,
    },
    #[error("Expected a JSON object for a {0} node")]
    NotAnObject(&'static str),
    #[error("A fault tree needs at least one wire")]
    EmptyTree,
}
