pub mod constraint;
pub mod diagnostics;
pub mod id;
pub mod model;
pub mod solver;

pub use constraint::Constraint;
pub use diagnostics::{Diagnostic, Severity};
pub use id::{IdGenerator, ObjectId};
pub use model::*;
pub use solver::{SolverConfig, transform_constraints};
