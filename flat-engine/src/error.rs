// Engine error types

use flat_graph::GraphError;
use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Fatal engine failures. Ambiguities and manual-resolution markers are not
/// errors; they travel as data on violations and plans.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The rewrite would change how `type_name.member` resolves
    #[error("unsound rewrite plan: `{type_name}.{member}` {reason}")]
    PlanUnsound {
        type_name: String,
        member: String,
        reason: String,
    },
}

impl EngineError {
    pub fn unsound(type_name: &str, member: &str, reason: String) -> Self {
        EngineError::PlanUnsound {
            type_name: type_name.to_string(),
            member: member.to_string(),
            reason,
        }
    }
}
