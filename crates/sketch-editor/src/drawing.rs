//! The kernel's only public entry point.
//!
//! `Drawing` owns both state halves, the ID generator, and the listener
//! list, and is the sole thing a host ever touches. Everything else in this
//! crate is an implementation detail reachable only through `send_event`,
//! the read-only accessors, and persistence.

use serde::{Deserialize, Serialize};
use sketch_core::{Diagnostic, IdGenerator, SolverConfig};
use sketch_render::HitTestConfig;

use crate::action::DataAction;
use crate::data_executor;
use crate::event::Event;
use crate::history::ActionHistory;
use crate::state::{DataState, ToolState};
use crate::tool_executor;
use crate::translator;

/// `send_event` is rejected while another call to it is already executing on
/// this `Drawing` — e.g. a listener that, through some external (non-Rust
/// borrow-checked) path, ends up invoking `send_event` again on the same
/// instance before the first call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendEventError {
    Reentrant,
}

impl std::fmt::Display for SendEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "send_event called reentrantly on the same Drawing")
    }
}

impl std::error::Error for SendEventError {}

/// Failure modes when reconstructing a `Drawing` from a saved action log.
#[derive(Debug)]
pub enum LoadError {
    Json(serde_json::Error),
    /// The log parsed fine but a recorded action doesn't make sense against
    /// the state replayed so far (e.g. a constraint naming an object ID no
    /// prior action ever added).
    Replay(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Json(e) => write!(f, "malformed action log: {e}"),
            LoadError::Replay(msg) => write!(f, "action log replay failed: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// On-disk representation: the primary timeline of `DataAction`s, in replay
/// order. `ToolState` and anything view-local is never persisted — a reload
/// always starts back in the Selector tool at the default zoom.
#[derive(Serialize, Deserialize)]
struct SaveFile {
    actions: Vec<DataAction>,
}

pub struct Drawing {
    data: DataState,
    tool: ToolState,
    id_gen: IdGenerator,
    solver_config: SolverConfig,
    hit_config: HitTestConfig,
    diagnostics: Vec<Diagnostic>,
    listeners: Vec<Box<dyn FnMut(&DataState, &ToolState)>>,
    sending: bool,
}

impl Drawing {
    pub fn new() -> Self {
        Self {
            data: DataState::default(),
            tool: ToolState::default(),
            id_gen: IdGenerator::new(),
            solver_config: SolverConfig::default(),
            hit_config: HitTestConfig::default(),
            diagnostics: Vec::new(),
            listeners: Vec::new(),
            sending: false,
        }
    }

    pub fn data_state(&self) -> &DataState {
        &self.data
    }

    pub fn tool_state(&self) -> &ToolState {
        &self.tool
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Register a listener invoked after every event that changes state.
    /// Listeners are notified in registration order over a length snapshot
    /// taken before the first call, so a listener registering another
    /// listener mid-notification doesn't get called in the same pass.
    pub fn on_change(&mut self, listener: impl FnMut(&DataState, &ToolState) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Render the current committed document to SVG. Scratch objects held
    /// by an in-progress Pen/Text tool are never included — only committed
    /// `DataState.objects`.
    pub fn export_svg(&self) -> String {
        sketch_render::export_svg(&self.data.objects, self.tool.data_origin)
    }

    /// Serialize the action-history tree's primary timeline. This is the
    /// only thing [`Drawing::load`] can reconstruct a document from.
    pub fn save(&self) -> Result<String, serde_json::Error> {
        let actions = self.tool.history.primary_timeline().into_iter().cloned().collect();
        serde_json::to_string(&SaveFile { actions })
    }

    /// Replace this `Drawing`'s document with one replayed from a saved
    /// action log. `ToolState` resets to its default; diagnostics
    /// accumulated before the load are discarded.
    pub fn load(&mut self, json: &str) -> Result<(), LoadError> {
        let save_file: SaveFile = serde_json::from_str(json).map_err(LoadError::Json)?;

        let mut data = DataState::default();
        let mut history = ActionHistory::new();
        for action in save_file.actions {
            validate_replay(&data, &action)?;
            data_executor::execute(&mut data, action.clone(), &self.solver_config);
            history.append(action);
        }

        let max_id = data.objects.iter().map(|(id, _)| id.raw()).max().unwrap_or(0);

        self.data = data;
        self.tool = ToolState { history, ..ToolState::default() };
        self.id_gen = IdGenerator::seeded(max_id + 1);
        self.diagnostics.clear();
        self.notify_listeners();
        Ok(())
    }

    /// The kernel's single ingress point. Translates `event` into actions,
    /// applies them, and notifies listeners — all within one reentrancy
    /// guard, so a listener that triggers another `send_event` on this same
    /// `Drawing` gets a clean error instead of re-entering mid-mutation.
    pub fn send_event(&mut self, event: Event) -> Result<(), SendEventError> {
        if self.sending {
            return Err(SendEventError::Reentrant);
        }
        self.sending = true;
        self.process_event(event);
        self.sending = false;
        Ok(())
    }

    fn process_event(&mut self, event: Event) {
        let (tool_actions, data_actions, new_diagnostics) = translator::generate_actions(
            &self.tool,
            &self.data,
            &event,
            &self.id_gen,
            &self.hit_config,
        );

        let mut changed = false;
        for action in tool_actions {
            changed |= tool_executor::execute(&mut self.tool, action);
        }
        for action in data_actions {
            changed |= data_executor::execute(&mut self.data, action, &self.solver_config);
        }
        changed |= !new_diagnostics.is_empty();
        self.diagnostics.extend(new_diagnostics);

        if changed {
            self.notify_listeners();
        }
    }

    fn notify_listeners(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in listeners.iter_mut() {
            listener(&self.data, &self.tool);
        }
        self.listeners = listeners;
    }
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject a `DataAction` that references an object no prior action in this
/// replay has introduced yet, rather than letting the data executor's
/// solver panic on a dangling lookup.
fn validate_replay(data: &DataState, action: &DataAction) -> Result<(), LoadError> {
    let missing = |label: &str, id: sketch_core::ObjectId| {
        LoadError::Replay(format!("{label} references unknown object {id}"))
    };

    match action {
        DataAction::AddObject(objects) => {
            for (_, object) in objects.iter() {
                for referenced in object.referenced_ids() {
                    if !objects.contains(referenced) && !data.objects.contains(referenced) {
                        return Err(missing("AddObject", referenced));
                    }
                }
            }
            Ok(())
        }
        DataAction::AddConstraint(constraint) => {
            for id in constraint_operands(constraint) {
                if !data.objects.contains(id) {
                    return Err(missing("AddConstraint", id));
                }
            }
            Ok(())
        }
    }
}

fn constraint_operands(constraint: &sketch_core::Constraint) -> Vec<sketch_core::ObjectId> {
    use sketch_core::Constraint::*;
    match *constraint {
        Perpendicular(a, b) | Parallel(a, b) | Coincident(a, b) => vec![a, b],
        Horizontal(a) | Vertical(a) => vec![a],
        Distance { object1, object2, .. } => {
            let mut v = vec![object1];
            v.extend(object2);
            v
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Button, ObjectRequest};
    use sketch_core::Point;

    #[test]
    fn add_object_event_round_trips_through_send_event() {
        let mut drawing = Drawing::new();
        drawing
            .send_event(Event::AddObject {
                guide: false,
                object: ObjectRequest::Node { point: Point::new(1.0, 2.0) },
            })
            .unwrap();
        assert_eq!(drawing.data_state().objects.len(), 1);
    }

    #[test]
    fn listeners_are_notified_after_send_event() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let calls = Rc::new(RefCell::new(0));
        let calls_clone = calls.clone();
        let mut drawing = Drawing::new();
        drawing.on_change(move |_, _| {
            *calls_clone.borrow_mut() += 1;
        });

        drawing
            .send_event(Event::AddObject {
                guide: false,
                object: ObjectRequest::Node { point: Point::ZERO },
            })
            .unwrap();

        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn reentrant_send_event_is_rejected() {
        let mut drawing = Drawing::new();
        drawing.sending = true;
        let result = drawing.send_event(Event::MouseMove { p: Point::ZERO });
        assert_eq!(result, Err(SendEventError::Reentrant));
    }

    #[test]
    fn save_then_load_reproduces_the_document() {
        let mut drawing = Drawing::new();
        drawing
            .send_event(Event::AddObject {
                guide: false,
                object: ObjectRequest::Node { point: Point::new(3.0, 4.0) },
            })
            .unwrap();
        let json = drawing.save().unwrap();

        let mut reloaded = Drawing::new();
        reloaded.load(&json).unwrap();
        assert_eq!(reloaded.data_state().objects.len(), 1);
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        let mut drawing = Drawing::new();
        assert!(matches!(drawing.load("not json"), Err(LoadError::Json(_))));
    }

    #[test]
    fn pan_sequence_updates_view_offset() {
        let mut drawing = Drawing::new();
        drawing
            .send_event(Event::MouseDown { button: Button::Secondary, ctrl: false, p: Point::new(10.0, 10.0) })
            .unwrap();
        drawing
            .send_event(Event::MouseMove { p: Point::new(30.0, 10.0) })
            .unwrap();
        // panning left-to-right by 20 px should shift the view offset by -20 on x
        assert_eq!(drawing.tool_state().view_box.offset.x, -20.0);
    }
}
