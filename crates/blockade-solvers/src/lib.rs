//! Blocking strategies: the spectral optimizer with its eigen and projection
//! kernels, degree and random baselines, and the greedy set selector.

pub mod baseline;
pub mod eigen;
pub mod projection;
pub mod registry;
pub mod selector;
pub mod spectral;

pub use baseline::{DegreeSolver, RandomSolver};
pub use registry::{AnySolver, SolverKind, SolverParams};
pub use selector::{Ranking, SampleId, SelectorLog, SetSelector};
pub use spectral::{SpectralConfig, SpectralSolver};
