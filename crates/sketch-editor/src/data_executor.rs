//! Applies `DataAction`s to `DataState`.
//!
//! `AddConstraint` is the one action with a visible side effect beyond the
//! document itself: it re-solves every constraint from scratch immediately
//! after appending, via [`sketch_core::transform_constraints`]. A divergent
//! solve is not an error — it leaves whatever the last iteration produced in
//! place and is logged, not surfaced as a `Diagnostic` (see the module docs
//! on `sketch_core::solver`).

use sketch_core::SolverConfig;

use crate::action::DataAction;
use crate::state::DataState;

/// Applies `action` and reports whether it actually mutated `data_state`.
/// The façade ORs this across every applied action to decide whether
/// listeners need notifying at all.
pub fn execute(data_state: &mut DataState, action: DataAction, solver_config: &SolverConfig) -> bool {
    match action {
        DataAction::AddObject(objects) => {
            let changed = !objects.is_empty();
            log::debug!("data_executor: merging {} object(s)", objects.len());
            data_state.objects.merge(objects);
            changed
        }
        DataAction::AddConstraint(constraint) => {
            log::debug!(
                "data_executor: adding {} constraint, re-solving {} constraint(s)",
                constraint.kind_name(),
                data_state.constraints.len() + 1
            );
            data_state.constraints.push(constraint);
            sketch_core::transform_constraints(&mut data_state.objects, &data_state.constraints, solver_config);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_core::{CanvasObject, Constraint, IdGenerator, Node, ObjectHeader, ObjectMap, Point};

    #[test]
    fn add_object_merges_into_data_state() {
        let gen = IdGenerator::new();
        let id = gen.next();
        let mut objects = ObjectMap::new();
        objects.insert(CanvasObject::Node(Node {
            header: ObjectHeader { id, guide: false },
            point: Point::new(1.0, 2.0),
        }));

        let mut data_state = DataState::default();
        execute(&mut data_state, DataAction::AddObject(objects), &SolverConfig::default());

        assert_eq!(data_state.objects.point_of(id), Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn add_constraint_appends_and_resolves() {
        let gen = IdGenerator::new();
        let a = gen.next();
        let b = gen.next();
        let mut data_state = DataState::default();
        data_state.objects.insert(CanvasObject::Node(Node {
            header: ObjectHeader { id: a, guide: false },
            point: Point::new(0.0, 0.0),
        }));
        data_state.objects.insert(CanvasObject::Node(Node {
            header: ObjectHeader { id: b, guide: false },
            point: Point::new(10.0, 3.0),
        }));

        execute(
            &mut data_state,
            DataAction::AddConstraint(Constraint::Distance { object1: a, object2: Some(b), distance: 5.0 }),
            &SolverConfig::default(),
        );

        assert_eq!(data_state.constraints.len(), 1);
        let pa = data_state.objects.point_of(a).unwrap();
        let pb = data_state.objects.point_of(b).unwrap();
        let dist = (pb - pa).length();
        assert!((dist - 5.0).abs() < 1e-6);
    }
}
