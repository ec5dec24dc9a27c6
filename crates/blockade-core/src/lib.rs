//! Graph model and solver contract for choosing nodes to block so that an
//! independent cascade started at a seed set spreads as little as possible.

pub mod error;
pub mod generators;
pub mod graph;
pub mod problem;
pub mod rng;
pub mod solver;

/// Core types
pub type NodeId = usize;
pub type Weight = f64;

pub use error::{BlockadeError, Result};
pub use graph::{Edge, Graph, GraphData};
pub use problem::Problem;
pub use rng::RngStream;
pub use solver::{BlockedSet, SolveLog, Solver};
