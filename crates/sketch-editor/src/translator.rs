//! Event → action translation.
//!
//! [`generate_actions`] is the kernel's only decision point: given the
//! current state and one incoming event, it decides what should happen, but
//! never applies it — [`crate::tool_executor`] and [`crate::data_executor`]
//! do that. The one side channel it's given is an [`IdGenerator`] reference,
//! since creating an object requires a fresh ID before an executor has had a
//! chance to assign one; beyond that it reads `ToolState`/`DataState` and
//! returns what to do.
//!
//! Constraint-arity checks live here rather than in the data executor: an
//! out-of-arity request never becomes a `DataAction` at all, so it can never
//! reach the history tree, and the caller gets a same-turn [`Diagnostic`]
//! explaining why nothing happened.

use sketch_core::{
    CanvasObject, Constraint, Diagnostic, FixedNode, IdGenerator, Line, Node, ObjectHeader, ObjectId, ObjectMap, Text,
};
use sketch_render::coords::{resize_view_box, viewport_to_data, viewport_to_svg};
use sketch_render::HitTestConfig;

use crate::action::{DataAction, ToolAction};
use crate::event::{Button, Event, ObjectRequest};
use crate::state::{DataState, LiveSubPath, PanState, ToolKind, ToolState};

/// Translate one event into the tool/data actions it should produce. Pure:
/// calling this twice with the same arguments (and an `id_gen` that hasn't
/// issued further IDs) produces identical output.
pub fn generate_actions(
    tool_state: &ToolState,
    data_state: &DataState,
    event: &Event,
    id_gen: &IdGenerator,
    hit_config: &HitTestConfig,
) -> (Vec<ToolAction>, Vec<DataAction>, Vec<Diagnostic>) {
    let mut tool_actions = Vec::new();
    let mut data_actions = Vec::new();
    let mut diagnostics = Vec::new();

    match event {
        Event::MouseMove { p } => {
            tool_actions.push(ToolAction::SetMousePoint(*p));
            if let PanState::Panning { start } = tool_state.pan {
                let new_offset = start - *p;
                tool_actions.push(ToolAction::SetViewOffset(new_offset));
            } else {
                let data_point = viewport_to_data(*p, tool_state.view_box.offset, tool_state.data_origin);
                match &tool_state.tool {
                    ToolKind::Pen { .. } => tool_actions.push(ToolAction::PenRubberBand(data_point)),
                    ToolKind::Text { .. } => tool_actions.push(ToolAction::TextUpdate {
                        point: Some(data_point),
                        body: None,
                    }),
                    ToolKind::Selector { .. } => {}
                }
            }
        }

        Event::MouseDown { button, ctrl, p } => match button {
            Button::Secondary => {
                let start = viewport_to_svg(*p, tool_state.view_box.offset);
                tool_actions.push(ToolAction::SetPan(PanState::Panning { start }));
            }
            Button::Primary => match &tool_state.tool {
                ToolKind::Pen { root_path_id: _, live, .. } => {
                    let data_point = viewport_to_data(*p, tool_state.view_box.offset, tool_state.data_origin);
                    let new_point_id = id_gen.next();
                    let new_line_id = id_gen.next();
                    let new_node = CanvasObject::Node(Node {
                        header: ObjectHeader { id: new_point_id, guide: false },
                        point: data_point,
                    });
                    let new_line = CanvasObject::Line(Line {
                        header: ObjectHeader { id: new_line_id, guide: false },
                        point1: live.last_point,
                        point2: new_point_id,
                    });
                    tool_actions.push(ToolAction::PenExtend {
                        new_objects: vec![new_node, new_line],
                        committed_point: live.last_point,
                        committed_line: live.last_line,
                        live: LiveSubPath {
                            last_point: new_point_id,
                            last_line: Some(new_line_id),
                        },
                    });
                }
                ToolKind::Text { temp_map, .. } => {
                    let data_action = DataAction::AddObject(temp_map.clone());
                    tool_actions.push(ToolAction::AddHistory(data_action.clone()));
                    tool_actions.push(ToolAction::SwitchTool(ToolKind::selector()));
                    data_actions.push(data_action);
                }
                ToolKind::Selector { selected } => {
                    let data_point = viewport_to_data(*p, tool_state.view_box.offset, tool_state.data_origin);
                    let hit = sketch_render::hit_object(&data_state.objects, hit_config, data_point);
                    let new_selection = next_selection(selected, hit, *ctrl);
                    tool_actions.push(ToolAction::SetSelection(new_selection));
                }
            },
            Button::Auxiliary => {}
        },

        Event::MouseUp { button, .. } => {
            if *button == Button::Secondary {
                if let PanState::Panning { .. } = tool_state.pan {
                    tool_actions.push(ToolAction::SetPan(PanState::Idle));
                }
            }
        }

        Event::KeyDown { key } => match key.as_str() {
            "Enter" => {
                if let ToolKind::Pen { temp_map, root_path_id, .. } = &tool_state.tool {
                    let pruned = sketch_core::filter_object_map(temp_map, &[*root_path_id]);
                    let data_action = DataAction::AddObject(pruned);
                    tool_actions.push(ToolAction::AddHistory(data_action.clone()));
                    tool_actions.push(ToolAction::SwitchTool(ToolKind::selector()));
                    data_actions.push(data_action);
                }
            }
            "p" => {
                tool_actions.push(enter_pen(tool_state, id_gen));
            }
            "s" => {
                tool_actions.push(ToolAction::SwitchTool(ToolKind::selector()));
            }
            _ => {}
        },

        Event::KeyUp { .. } => {}

        Event::ResizeView { w, h } => {
            let (width, height) = resize_view_box(*w, *h, tool_state.scale);
            tool_actions.push(ToolAction::ResizeView { width, height });
        }

        Event::ScaleView { s } => tool_actions.push(ToolAction::ScaleView(*s)),

        Event::SetViewOffset { o } => tool_actions.push(ToolAction::SetViewOffset(*o)),

        Event::AddPerpendicularConstraint => constraint_event(
            tool_state,
            &data_state.objects,
            &[2],
            |objects, sel| is_line(objects, sel[0]) && is_line(objects, sel[1]),
            |sel| Constraint::Perpendicular(sel[0], sel[1]),
            &mut tool_actions,
            &mut data_actions,
            &mut diagnostics,
        ),
        Event::AddCoincidentConstraint => constraint_event(
            tool_state,
            &data_state.objects,
            &[2],
            coincident_kind_ok,
            |sel| Constraint::Coincident(sel[0], sel[1]),
            &mut tool_actions,
            &mut data_actions,
            &mut diagnostics,
        ),
        Event::AddHorizontalConstraint => constraint_event(
            tool_state,
            &data_state.objects,
            &[1],
            |objects, sel| is_line(objects, sel[0]),
            |sel| Constraint::Horizontal(sel[0]),
            &mut tool_actions,
            &mut data_actions,
            &mut diagnostics,
        ),
        Event::AddVerticalConstraint => constraint_event(
            tool_state,
            &data_state.objects,
            &[1],
            |objects, sel| is_line(objects, sel[0]),
            |sel| Constraint::Vertical(sel[0]),
            &mut tool_actions,
            &mut data_actions,
            &mut diagnostics,
        ),
        Event::AddDistanceConstraint { d } => constraint_event(
            tool_state,
            &data_state.objects,
            &[1, 2],
            distance_kind_ok,
            |sel| Constraint::Distance {
                object1: sel[0],
                object2: sel.get(1).copied(),
                distance: *d,
            },
            &mut tool_actions,
            &mut data_actions,
            &mut diagnostics,
        ),

        Event::SelectTextTool => {
            let anchor_id = id_gen.next();
            let text_id = id_gen.next();
            let mut temp_map = ObjectMap::new();
            temp_map.insert(CanvasObject::Node(Node {
                header: ObjectHeader { id: anchor_id, guide: false },
                point: tool_state.mouse_in_data_space(),
            }));
            temp_map.insert(CanvasObject::Text(Text {
                header: ObjectHeader { id: text_id, guide: false },
                anchor: anchor_id,
                body: String::new(),
            }));
            tool_actions.push(ToolAction::SwitchTool(ToolKind::Text {
                temp_map,
                anchor_id,
                text_id,
            }));
        }

        Event::SetTextValue { text } => {
            if let ToolKind::Text { .. } = &tool_state.tool {
                tool_actions.push(ToolAction::TextUpdate {
                    point: None,
                    body: Some(text.clone()),
                });
            }
        }

        Event::AddObject { guide, object } => {
            let id = id_gen.next();
            let canvas_object = match object {
                ObjectRequest::Node { point } => CanvasObject::Node(Node {
                    header: ObjectHeader { id, guide: *guide },
                    point: *point,
                }),
                ObjectRequest::FixedNode { point } => CanvasObject::FixedNode(FixedNode {
                    header: ObjectHeader { id, guide: *guide },
                    point: *point,
                }),
                ObjectRequest::Line { point1, point2 } => CanvasObject::Line(Line {
                    header: ObjectHeader { id, guide: *guide },
                    point1: *point1,
                    point2: *point2,
                }),
                ObjectRequest::Text { anchor, body } => CanvasObject::Text(Text {
                    header: ObjectHeader { id, guide: *guide },
                    anchor: *anchor,
                    body: body.clone(),
                }),
            };
            let mut map = ObjectMap::new();
            map.insert(canvas_object);
            let data_action = DataAction::AddObject(map);
            tool_actions.push(ToolAction::AddHistory(data_action.clone()));
            data_actions.push(data_action);
        }
    }

    (tool_actions, data_actions, diagnostics)
}

fn next_selection(current: &[sketch_core::ObjectId], hit: Option<sketch_core::ObjectId>, ctrl: bool) -> Vec<sketch_core::ObjectId> {
    match (ctrl, hit) {
        (true, Some(id)) => {
            let mut next: Vec<_> = current.to_vec();
            if let Some(pos) = next.iter().position(|&x| x == id) {
                next.remove(pos);
            } else {
                next.push(id);
            }
            next
        }
        (true, None) => current.to_vec(),
        (false, Some(id)) => vec![id],
        (false, None) => Vec::new(),
    }
}

fn enter_pen(tool_state: &ToolState, id_gen: &IdGenerator) -> ToolAction {
    let root_path_id = id_gen.next();
    let tip_id = id_gen.next();
    let mut temp_map = ObjectMap::new();
    temp_map.insert(CanvasObject::Path(sketch_core::Path {
        header: ObjectHeader { id: root_path_id, guide: false },
        points: Vec::new(),
        lines: Vec::new(),
    }));
    temp_map.insert(CanvasObject::Node(Node {
        header: ObjectHeader { id: tip_id, guide: false },
        point: tool_state.mouse_in_data_space(),
    }));
    ToolAction::SwitchTool(ToolKind::Pen {
        temp_map,
        root_path_id,
        live: LiveSubPath { last_point: tip_id, last_line: None },
    })
}

fn is_line(objects: &ObjectMap, id: ObjectId) -> bool {
    matches!(objects.get(id), Some(CanvasObject::Line(_)))
}

fn is_point_like(objects: &ObjectMap, id: ObjectId) -> bool {
    objects.get(id).is_some_and(|o| o.point().is_some())
}

/// `Coincident` accepts (point, point) or (point, line) in either order, but
/// never (line, line) — the solver has no equation for that combination and
/// would otherwise register both operands as fixed (non-`Node`) variables.
fn coincident_kind_ok(objects: &ObjectMap, sel: &[ObjectId]) -> bool {
    match (is_line(objects, sel[0]), is_line(objects, sel[1])) {
        (true, true) => false,
        (true, false) => is_point_like(objects, sel[1]),
        (false, true) => is_point_like(objects, sel[0]),
        (false, false) => is_point_like(objects, sel[0]) && is_point_like(objects, sel[1]),
    }
}

/// `Distance` takes either a single Line (distance between its own
/// endpoints) or two point-like operands.
fn distance_kind_ok(objects: &ObjectMap, sel: &[ObjectId]) -> bool {
    match sel.len() {
        1 => is_line(objects, sel[0]),
        2 => is_point_like(objects, sel[0]) && is_point_like(objects, sel[1]),
        _ => false,
    }
}

/// Shared arity- and kind-checked constraint dispatch: `arities` lists the
/// accepted selection sizes, `kind_ok` checks the selected objects are the
/// right variants for the constraint being built, and `build` turns a
/// validated selection into the `Constraint`. Both checks happen before
/// `build` ever runs, so a mismatch never reaches the solver — `register_line`
/// / `register_point` in `sketch_core::solver` assume their operand kinds
/// hold and panic otherwise.
fn constraint_event(
    tool_state: &ToolState,
    objects: &ObjectMap,
    arities: &[usize],
    kind_ok: impl Fn(&ObjectMap, &[ObjectId]) -> bool,
    build: impl FnOnce(&[ObjectId]) -> Constraint,
    tool_actions: &mut Vec<ToolAction>,
    data_actions: &mut Vec<DataAction>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(selected) = tool_state.tool.selection() else {
        log::warn!("translator: constraint requested while the Selector tool is not active");
        diagnostics.push(Diagnostic::warning(
            "constraint-arity",
            "constraint requested while the Selector tool is not active",
        ));
        return;
    };
    if !arities.contains(&selected.len()) {
        log::warn!(
            "translator: constraint needs {:?} selected object(s), got {}",
            arities,
            selected.len()
        );
        diagnostics.push(Diagnostic::warning(
            "constraint-arity",
            format!(
                "constraint needs {:?} selected object(s), got {}",
                arities,
                selected.len()
            ),
        ));
        return;
    }
    if !kind_ok(objects, selected) {
        log::warn!("translator: selected object(s) are not the right kind for this constraint");
        diagnostics.push(Diagnostic::warning(
            "constraint-operand-kind",
            "selected object(s) are not the right kind for this constraint",
        ));
        return;
    }
    let constraint = build(selected);
    log::debug!("translator: adding {} constraint", constraint.kind_name());
    let data_action = DataAction::AddConstraint(constraint);
    tool_actions.push(ToolAction::AddHistory(data_action.clone()));
    data_actions.push(data_action);
}
