// Graph construction and edit errors

use thiserror::Error;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The embedding relation contains a cycle; `cycle` starts and ends on the same type
    #[error("cyclic embedding: {}", .cycle.join(" -> "))]
    CyclicEmbedding { cycle: Vec<String> },

    #[error("unknown type `{name}`")]
    UnknownType { name: String },

    #[error("type `{type_name}` has no member `{member}`")]
    UnknownMember { type_name: String, member: String },

    #[error("type `{name}` is declared more than once")]
    DuplicateType { name: String },

    #[error("type `{owner}` already declares `{member}`")]
    DuplicateMember { owner: String, member: String },

    #[error("type `{owner}` does not embed `{target}`")]
    MissingEmbedding { owner: String, target: String },
}

impl GraphError {
    /// Name of the type the error is about
    pub fn type_name(&self) -> &str {
        match self {
            GraphError::CyclicEmbedding { cycle } => {
                cycle.first().map(String::as_str).unwrap_or("<graph>")
            }
            GraphError::UnknownType { name } | GraphError::DuplicateType { name } => name,
            GraphError::UnknownMember { type_name, .. } => type_name,
            GraphError::DuplicateMember { owner, .. }
            | GraphError::MissingEmbedding { owner, .. } => owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message() {
        let err = GraphError::CyclicEmbedding {
            cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        assert_eq!(err.to_string(), "cyclic embedding: A -> B -> A");
        assert_eq!(err.type_name(), "A");
    }
}
