//! Geometric constraints attachable to selected objects.
//!
//! A [`Constraint`] only names *which* objects participate; the equations it
//! contributes to the solver live in [`crate::solver`]. Constraints are
//! stored in insertion order in `DataState.constraints` — order carries no
//! semantic weight, it exists purely so serialisation is reproducible.

use crate::id::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Constraint {
    /// Two lines' direction vectors are perpendicular.
    Perpendicular(ObjectId, ObjectId),
    /// Two lines' direction vectors are parallel.
    ///
    /// Stub: the solver's equation table has no entry for this variant. It
    /// round-trips through the data model and participates in arity
    /// checking like any other constraint, but contributes zero residuals.
    Parallel(ObjectId, ObjectId),
    /// Two points coincide, or a point lies on a line.
    Coincident(ObjectId, ObjectId),
    /// A line's endpoints share the same y coordinate.
    Horizontal(ObjectId),
    /// A line's endpoints share the same x coordinate.
    Vertical(ObjectId),
    /// Fixed distance between two points, or between a single line's own
    /// endpoints (`object2 == None`).
    Distance {
        object1: ObjectId,
        object2: Option<ObjectId>,
        distance: f64,
    },
}

impl Constraint {
    /// The kind name, for logging/diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Constraint::Perpendicular(..) => "Perpendicular",
            Constraint::Parallel(..) => "Parallel",
            Constraint::Coincident(..) => "Coincident",
            Constraint::Horizontal(..) => "Horizontal",
            Constraint::Vertical(..) => "Vertical",
            Constraint::Distance { .. } => "Distance",
        }
    }
}
