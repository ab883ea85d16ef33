//! Applies `ToolAction`s to `ToolState`. The only executor that never
//! touches `DataState` — tool bookkeeping and document data are kept on
//! separate mutation paths on purpose.

use sketch_core::CanvasObject;

use crate::action::ToolAction;
use crate::state::{ToolKind, ToolState};

/// Applies `action` and reports whether it actually mutated `tool_state`.
/// The façade ORs this across every applied action to decide whether
/// listeners need notifying at all.
pub fn execute(tool_state: &mut ToolState, action: ToolAction) -> bool {
    match action {
        ToolAction::SetMousePoint(p) => {
            let changed = tool_state.mouse_point != p;
            tool_state.mouse_point = p;
            changed
        }
        ToolAction::SwitchTool(tool) => {
            tool_state.tool = tool;
            true
        }
        ToolAction::SetSelection(selected) => {
            if let ToolKind::Selector { selected: current } = &mut tool_state.tool {
                let changed = *current != selected;
                *current = selected;
                changed
            } else {
                false
            }
        }
        ToolAction::PenRubberBand(point) => {
            if let ToolKind::Pen { temp_map, live, .. } = &mut tool_state.tool {
                if let Some(CanvasObject::Node(node)) = temp_map.get_mut(live.last_point) {
                    node.point = point;
                    return true;
                }
            }
            false
        }
        ToolAction::PenExtend {
            new_objects,
            committed_point,
            committed_line,
            live,
        } => {
            if let ToolKind::Pen { temp_map, root_path_id, live: cur_live } = &mut tool_state.tool {
                if let Some(CanvasObject::Path(path)) = temp_map.get_mut(*root_path_id) {
                    path.points.push(committed_point);
                    if let Some(line_id) = committed_line {
                        path.lines.push(line_id);
                    }
                }
                for object in new_objects {
                    temp_map.insert(object);
                }
                *cur_live = live;
                true
            } else {
                false
            }
        }
        ToolAction::TextUpdate { point, body } => {
            if let ToolKind::Text { temp_map, anchor_id, text_id } = &mut tool_state.tool {
                let mut changed = false;
                if let Some(p) = point {
                    if let Some(CanvasObject::Node(node)) = temp_map.get_mut(*anchor_id) {
                        node.point = p;
                        changed = true;
                    }
                }
                if let Some(body) = body {
                    if let Some(CanvasObject::Text(text)) = temp_map.get_mut(*text_id) {
                        text.body = body;
                        changed = true;
                    }
                }
                changed
            } else {
                false
            }
        }
        ToolAction::SetViewOffset(offset) => {
            let changed = tool_state.view_box.offset != offset;
            tool_state.view_box.offset = offset;
            changed
        }
        ToolAction::ResizeView { width, height } => {
            let changed = tool_state.view_box.width != width || tool_state.view_box.height != height;
            tool_state.view_box.width = width;
            tool_state.view_box.height = height;
            changed
        }
        ToolAction::ScaleView(scale) => {
            let changed = tool_state.scale != scale;
            tool_state.scale = scale;
            changed
        }
        ToolAction::SetPan(pan) => {
            let changed = tool_state.pan != pan;
            tool_state.pan = pan;
            changed
        }
        ToolAction::AddHistory(data_action) => {
            tool_state.history.append(data_action);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_core::{IdGenerator, Node, ObjectHeader, ObjectMap, Path, Point, Text};

    #[test]
    fn set_mouse_point_updates_state() {
        let mut tool_state = ToolState::default();
        execute(&mut tool_state, ToolAction::SetMousePoint(Point::new(3.0, 4.0)));
        assert_eq!(tool_state.mouse_point, Point::new(3.0, 4.0));
    }

    #[test]
    fn pen_rubber_band_moves_the_live_tip_node() {
        let gen = IdGenerator::new();
        let tip_id = gen.next();
        let path_id = gen.next();
        let mut temp_map = ObjectMap::new();
        temp_map.insert(CanvasObject::Node(Node {
            header: ObjectHeader { id: tip_id, guide: false },
            point: Point::ZERO,
        }));
        temp_map.insert(CanvasObject::Path(Path {
            header: ObjectHeader { id: path_id, guide: false },
            points: vec![],
            lines: vec![],
        }));
        let mut tool_state = ToolState::default();
        tool_state.tool = ToolKind::Pen {
            temp_map,
            root_path_id: path_id,
            live: crate::state::LiveSubPath { last_point: tip_id, last_line: None },
        };

        execute(&mut tool_state, ToolAction::PenRubberBand(Point::new(9.0, 9.0)));

        if let ToolKind::Pen { temp_map, .. } = &tool_state.tool {
            assert_eq!(temp_map.point_of(tip_id), Some(Point::new(9.0, 9.0)));
        } else {
            panic!("expected Pen tool");
        }
    }

    #[test]
    fn text_update_replaces_body_and_moves_anchor() {
        let gen = IdGenerator::new();
        let anchor_id = gen.next();
        let text_id = gen.next();
        let mut temp_map = ObjectMap::new();
        temp_map.insert(CanvasObject::Node(Node {
            header: ObjectHeader { id: anchor_id, guide: false },
            point: Point::ZERO,
        }));
        temp_map.insert(CanvasObject::Text(Text {
            header: ObjectHeader { id: text_id, guide: false },
            anchor: anchor_id,
            body: String::new(),
        }));
        let mut tool_state = ToolState::default();
        tool_state.tool = ToolKind::Text { temp_map, anchor_id, text_id };

        execute(
            &mut tool_state,
            ToolAction::TextUpdate { point: Some(Point::new(1.0, 1.0)), body: Some("hi".to_string()) },
        );

        if let ToolKind::Text { temp_map, .. } = &tool_state.tool {
            assert_eq!(temp_map.point_of(anchor_id), Some(Point::new(1.0, 1.0)));
            match temp_map.get(text_id) {
                Some(CanvasObject::Text(t)) => assert_eq!(t.body, "hi"),
                _ => panic!("expected Text object"),
            }
        } else {
            panic!("expected Text tool");
        }
    }
}
