use crate::NodeId;
use thiserror::Error;

/// Every failure the blocking engine can report.
///
/// Configuration errors are raised while building a [`crate::Graph`] or
/// [`crate::Problem`]; precondition errors are raised by the simulator before
/// any realization runs; numeric errors abort a spectral solve.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BlockadeError {
    #[error("graph can not be empty")]
    EmptyGraph,

    #[error("seeds can not be empty")]
    EmptySeeds,

    #[error("k should be greater than 0")]
    ZeroBudget,

    #[error("budget k={k} exceeds the {available} non-seed nodes available")]
    BudgetTooLarge { k: usize, available: usize },

    #[error("seed node {0} is not in the graph")]
    UnknownSeed(NodeId),

    #[error("blocked node {node} of candidate '{candidate}' is not in the graph")]
    UnknownBlocked { candidate: String, node: NodeId },

    #[error("edge {u}->{v} references a node that is not in the graph")]
    UnknownEndpoint { u: NodeId, v: NodeId },

    #[error("node {0} is listed more than once")]
    DuplicateNode(NodeId),

    #[error("edge {u}->{v} has weight {w}, expected a probability in [0, 1]")]
    InvalidWeight { u: NodeId, v: NodeId, w: f64 },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("matrix entry ({row}, {col}) is not finite")]
    NonFiniteMatrix { row: usize, col: usize },

    #[error("symmetric eigen-decomposition did not converge on a {0}x{0} matrix")]
    EigenFailure(usize),
}

pub type Result<T> = std::result::Result<T, BlockadeError>;
