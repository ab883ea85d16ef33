//! Constraint solver: turns the constraint list into a system of nonlinear
//! scalar equations in the coordinates of free points and drives it to a
//! root by damped Newton iteration over a rectangular Jacobian solved via
//! SVD.
//!
//! Invoked once per `AddConstraint`, rebuilding everything from scratch each
//! time — constraint lists are short, so reconstruction is cheap next to the
//! SVD itself. The solver mutates only `Node.point`; it never inserts,
//! removes, or re-parents objects, and it never touches `Constraint`s or
//! `ToolState`.

use crate::constraint::Constraint;
use crate::id::ObjectId;
use crate::model::{CanvasObject, ObjectMap, Point};
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;

/// Tunables for [`transform_constraints`]. Defaults match production
/// values; construct with explicit fields to loosen them in tests or to
/// tune convergence against a particular solver backend.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Upper bound on Newton iterations. The loop always runs this many
    /// times unless early exit is enabled and triggers first.
    pub max_iterations: usize,
    /// If `Some(eps)`, the loop exits as soon as `‖Δ‖∞ < eps`. `None`
    /// reproduces the reference behavior of always running `max_iterations`
    /// times.
    pub early_exit_epsilon: Option<f64>,
    /// Singular-value cutoff passed to the SVD pseudo-inverse; singular
    /// values below this (relative to the largest) are treated as zero,
    /// which is what makes an under-determined system return the
    /// minimum-norm step instead of blowing up.
    pub svd_rank_epsilon: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            early_exit_epsilon: Some(1e-9),
            svd_rank_epsilon: 1e-12,
        }
    }
}

/// `(object, axis)` → solver column. `axis` is `0` for x, `1` for y. A
/// `FixedNode` coordinate is assigned the sentinel column `-1`: it is read
/// from the object map as a constant and never appears in the Jacobian.
#[derive(Default)]
struct VariableTable {
    columns: HashMap<(ObjectId, u8), i64>,
    /// First-encounter order of *free* columns — doubles as the write-back
    /// order and the initial-`x` order. Two solves over the same constraint
    /// list in the same order always assign identical columns, which is what
    /// makes repeated solves deterministic.
    free_order: Vec<(ObjectId, u8)>,
}

impl VariableTable {
    /// Register `(id, axis)` if not already present. No-op on double
    /// inclusion. Returns the assigned column (`-1` for a fixed point).
    fn add_variable(&mut self, id: ObjectId, axis: u8, objects: &ObjectMap) -> i64 {
        if let Some(&col) = self.columns.get(&(id, axis)) {
            return col;
        }
        let is_free = matches!(objects.get(id), Some(CanvasObject::Node(_)));
        let col = if is_free {
            let col = self.free_order.len() as i64;
            self.free_order.push((id, axis));
            col
        } else {
            -1
        };
        self.columns.insert((id, axis), col);
        col
    }

    fn column(&self, id: ObjectId, axis: u8) -> i64 {
        *self.columns.get(&(id, axis)).expect("variable not registered")
    }

    fn num_columns(&self) -> usize {
        self.free_order.len()
    }

    /// Resolve `id`'s coordinate on `axis`, reading from `x` if it's a free
    /// column or from `objects` if it's fixed.
    fn coord(&self, id: ObjectId, axis: u8, x: &DVector<f64>, objects: &ObjectMap) -> f64 {
        let col = self.column(id, axis);
        if col >= 0 {
            x[col as usize]
        } else {
            let p = objects.point_of(id).expect("fixed point must resolve");
            if axis == 0 { p.x } else { p.y }
        }
    }

    fn point(&self, id: ObjectId, x: &DVector<f64>, objects: &ObjectMap) -> Point {
        Point::new(
            self.coord(id, 0, x, objects),
            self.coord(id, 1, x, objects),
        )
    }

    /// Add `value` into `row[col]`, dropping writes to the fixed sentinel.
    fn accumulate(&self, row: &mut [f64], id: ObjectId, axis: u8, value: f64) {
        let col = self.column(id, axis);
        if col >= 0 {
            row[col as usize] += value;
        }
    }
}

/// One scalar equation: a residual function and its Jacobian row, both
/// closed over the operand IDs captured at assembly time. Kept as a small
/// tagged enum (rather than boxed closures) so the hot loop stays a plain
/// `match` — faster and trivially unit-testable per operand kind.
enum Equation {
    Perpendicular {
        p1: ObjectId,
        p2: ObjectId,
        p3: ObjectId,
        p4: ObjectId,
    },
    Horizontal {
        p1: ObjectId,
        p2: ObjectId,
    },
    Vertical {
        p1: ObjectId,
        p2: ObjectId,
    },
    Distance {
        p1: ObjectId,
        p2: ObjectId,
        d: f64,
    },
    /// One axis of a point-point coincidence. Two of these (axis 0 and 1)
    /// are emitted per `Coincident(point, point)` constraint.
    CoincidentAxis {
        a: ObjectId,
        b: ObjectId,
        axis: u8,
    },
    CoincidentPointLine {
        point: ObjectId,
        p1: ObjectId,
        p2: ObjectId,
    },
}

impl Equation {
    fn residual(&self, vars: &VariableTable, x: &DVector<f64>, objects: &ObjectMap) -> f64 {
        match *self {
            Equation::Perpendicular { p1, p2, p3, p4 } => {
                let (p1, p2, p3, p4) = (
                    vars.point(p1, x, objects),
                    vars.point(p2, x, objects),
                    vars.point(p3, x, objects),
                    vars.point(p4, x, objects),
                );
                (p2 - p1).dot(p4 - p3)
            }
            Equation::Horizontal { p1, p2 } => {
                vars.coord(p1, 1, x, objects) - vars.coord(p2, 1, x, objects)
            }
            Equation::Vertical { p1, p2 } => {
                vars.coord(p1, 0, x, objects) - vars.coord(p2, 0, x, objects)
            }
            Equation::Distance { p1, p2, d } => {
                let (p1, p2) = (vars.point(p1, x, objects), vars.point(p2, x, objects));
                (p2 - p1).length_squared() - d * d
            }
            Equation::CoincidentAxis { a, b, axis } => {
                vars.coord(a, axis, x, objects) - vars.coord(b, axis, x, objects)
            }
            Equation::CoincidentPointLine { point, p1, p2 } => {
                let (point, p1, p2) = (
                    vars.point(point, x, objects),
                    vars.point(p1, x, objects),
                    vars.point(p2, x, objects),
                );
                (p2 - p1).cross(point - p1)
            }
        }
    }

    fn jacobian_row(&self, vars: &VariableTable, x: &DVector<f64>, objects: &ObjectMap, row: &mut [f64]) {
        match *self {
            Equation::Perpendicular { p1, p2, p3, p4 } => {
                let (pt1, pt2, pt3, pt4) = (
                    vars.point(p1, x, objects),
                    vars.point(p2, x, objects),
                    vars.point(p3, x, objects),
                    vars.point(p4, x, objects),
                );
                let d_p1 = pt3 - pt4;
                let d_p2 = pt4 - pt3;
                let d_p3 = pt1 - pt2;
                let d_p4 = pt2 - pt1;
                vars.accumulate(row, p1, 0, d_p1.x);
                vars.accumulate(row, p1, 1, d_p1.y);
                vars.accumulate(row, p2, 0, d_p2.x);
                vars.accumulate(row, p2, 1, d_p2.y);
                vars.accumulate(row, p3, 0, d_p3.x);
                vars.accumulate(row, p3, 1, d_p3.y);
                vars.accumulate(row, p4, 0, d_p4.x);
                vars.accumulate(row, p4, 1, d_p4.y);
            }
            Equation::Horizontal { p1, p2 } => {
                vars.accumulate(row, p1, 1, 1.0);
                vars.accumulate(row, p2, 1, -1.0);
            }
            Equation::Vertical { p1, p2 } => {
                vars.accumulate(row, p1, 0, 1.0);
                vars.accumulate(row, p2, 0, -1.0);
            }
            Equation::Distance { p1, p2, .. } => {
                let (pt1, pt2) = (vars.point(p1, x, objects), vars.point(p2, x, objects));
                let d = (pt2 - pt1) * 2.0;
                vars.accumulate(row, p1, 0, -d.x);
                vars.accumulate(row, p1, 1, -d.y);
                vars.accumulate(row, p2, 0, d.x);
                vars.accumulate(row, p2, 1, d.y);
            }
            Equation::CoincidentAxis { a, b, axis } => {
                vars.accumulate(row, a, axis, 1.0);
                vars.accumulate(row, b, axis, -1.0);
            }
            Equation::CoincidentPointLine { point, p1, p2 } => {
                let (pt, pt1, pt2) = (
                    vars.point(point, x, objects),
                    vars.point(p1, x, objects),
                    vars.point(p2, x, objects),
                );
                vars.accumulate(row, p1, 0, pt1.y - pt.y);
                vars.accumulate(row, p1, 1, pt2.y - pt1.y);
                vars.accumulate(row, p2, 0, pt.y - pt1.y);
                vars.accumulate(row, p2, 1, pt1.x - pt.x);
                vars.accumulate(row, point, 0, pt1.y - pt2.y);
                vars.accumulate(row, point, 1, pt2.x - pt1.x);
            }
        }
    }
}

/// Resolve the two point-like endpoints of `line_id`, registering both of
/// their (x, y) coordinates as variables.
fn register_line(vars: &mut VariableTable, objects: &ObjectMap, line_id: ObjectId) -> (ObjectId, ObjectId) {
    let (p1, p2) = objects
        .line_endpoints(line_id)
        .expect("constraint referenced a non-Line as a line operand");
    for p in [p1, p2] {
        vars.add_variable(p, 0, objects);
        vars.add_variable(p, 1, objects);
    }
    (p1, p2)
}

fn register_point(vars: &mut VariableTable, objects: &ObjectMap, point_id: ObjectId) {
    vars.add_variable(point_id, 0, objects);
    vars.add_variable(point_id, 1, objects);
}

/// Build the equation list for one constraint, registering every point-like
/// operand it touches along the way.
fn lower_constraint(vars: &mut VariableTable, objects: &ObjectMap, constraint: &Constraint) -> Vec<Equation> {
    match *constraint {
        Constraint::Perpendicular(l1, l2) => {
            let (p1, p2) = register_line(vars, objects, l1);
            let (p3, p4) = register_line(vars, objects, l2);
            vec![Equation::Perpendicular { p1, p2, p3, p4 }]
        }
        Constraint::Parallel(l1, l2) => {
            // Stub: still register the operands' variables (per the walk
            // contract), emit no equations.
            register_line(vars, objects, l1);
            register_line(vars, objects, l2);
            vec![]
        }
        Constraint::Horizontal(l) => {
            let (p1, p2) = register_line(vars, objects, l);
            vec![Equation::Horizontal { p1, p2 }]
        }
        Constraint::Vertical(l) => {
            let (p1, p2) = register_line(vars, objects, l);
            vec![Equation::Vertical { p1, p2 }]
        }
        Constraint::Distance {
            object1,
            object2,
            distance,
        } => {
            let (p1, p2) = match object2 {
                Some(object2) => {
                    register_point(vars, objects, object1);
                    register_point(vars, objects, object2);
                    (object1, object2)
                }
                None => register_line(vars, objects, object1),
            };
            vec![Equation::Distance { p1, p2, d: distance }]
        }
        Constraint::Coincident(a, b) => {
            let a_is_line = matches!(objects.get(a), Some(CanvasObject::Line(_)));
            let b_is_line = matches!(objects.get(b), Some(CanvasObject::Line(_)));
            match (a_is_line, b_is_line) {
                (false, true) => {
                    let (p1, p2) = register_line(vars, objects, b);
                    register_point(vars, objects, a);
                    vec![Equation::CoincidentPointLine { point: a, p1, p2 }]
                }
                (true, false) => {
                    let (p1, p2) = register_line(vars, objects, a);
                    register_point(vars, objects, b);
                    vec![Equation::CoincidentPointLine { point: b, p1, p2 }]
                }
                _ => {
                    register_point(vars, objects, a);
                    register_point(vars, objects, b);
                    vec![
                        Equation::CoincidentAxis { a, b, axis: 0 },
                        Equation::CoincidentAxis { a, b, axis: 1 },
                    ]
                }
            }
        }
    }
}

/// Re-solve the whole system: assemble variables and equations from
/// `constraints`, then run damped Newton iteration to a root and write the
/// result back into `objects`. Mutates only `Node.point`.
pub fn transform_constraints(objects: &mut ObjectMap, constraints: &[Constraint], config: &SolverConfig) {
    let mut vars = VariableTable::default();
    let mut equations = Vec::new();
    for constraint in constraints {
        equations.extend(lower_constraint(&mut vars, objects, constraint));
    }

    let cols = vars.num_columns();
    let rows = equations.len();
    log::debug!("transform_constraints: {rows} equations over {cols} variables");

    if cols == 0 {
        // Nothing free to solve for (e.g. only a Parallel stub, or all
        // operands are FixedNodes).
        return;
    }

    let mut x = DVector::<f64>::zeros(cols);
    for (col, &(id, axis)) in vars.free_order.iter().enumerate() {
        let p = objects.point_of(id).expect("free variable must be a Node");
        x[col] = if axis == 0 { p.x } else { p.y };
    }

    if rows > 0 {
        for iteration in 0..config.max_iterations {
            let mut f = DVector::<f64>::zeros(rows);
            let mut j = DMatrix::<f64>::zeros(rows, cols);
            for (i, eq) in equations.iter().enumerate() {
                f[i] = -eq.residual(&vars, &x, objects);
                let mut row = vec![0.0; cols];
                eq.jacobian_row(&vars, &x, objects, &mut row);
                for (c, value) in row.into_iter().enumerate() {
                    j[(i, c)] = value;
                }
            }

            let pseudo_inverse = j
                .clone()
                .svd(true, true)
                .pseudo_inverse(config.svd_rank_epsilon)
                .unwrap_or_else(|_| DMatrix::zeros(cols, rows));
            let delta = pseudo_inverse * f;
            x += &delta;

            log::trace!(
                "transform_constraints: iteration {iteration} step norm {:.3e}",
                delta.amax()
            );

            if let Some(eps) = config.early_exit_epsilon {
                if delta.amax() < eps {
                    log::debug!("transform_constraints: converged after {} iterations", iteration + 1);
                    break;
                }
            }
        }
    }

    for (col, &(id, axis)) in vars.free_order.iter().enumerate() {
        if let Some(CanvasObject::Node(node)) = objects.get_mut(id) {
            if axis == 0 {
                node.point.x = x[col];
            } else {
                node.point.y = x[col];
            }
        }
    }
}
