//! The two state halves the kernel juggles: durable document data and
//! transient interaction state.
//!
//! `DataState` is the only part worth persisting — `ToolState` is rebuilt
//! fresh every session (a reload starts back in the Selector tool, with no
//! pan offset and a default zoom).

use crate::history::ActionHistory;
use sketch_core::{Constraint, ObjectId, ObjectMap, Point};

/// The durable half: everything a save file actually carries.
#[derive(Debug, Clone, Default)]
pub struct DataState {
    pub objects: ObjectMap,
    pub constraints: Vec<Constraint>,
}

/// A Node mid-construction inside the Pen tool's scratch map: the point
/// currently following the cursor, and the line (if any) connecting it back
/// to the last committed point.
#[derive(Debug, Clone, Copy)]
pub struct LiveSubPath {
    pub last_point: ObjectId,
    pub last_line: Option<ObjectId>,
}

/// Which tool is active, plus whatever scratch state that tool needs between
/// events. Each tool's scratch objects live in a private `ObjectMap` that
/// never touches `DataState.objects` until committed.
#[derive(Debug, Clone)]
pub enum ToolKind {
    /// `selected` is insertion-ordered, not a set: constraint events treat
    /// "the first two selected" and "the most recently selected" as
    /// distinct operands, so order is observable.
    Selector { selected: Vec<ObjectId> },
    Pen {
        temp_map: ObjectMap,
        root_path_id: ObjectId,
        live: LiveSubPath,
    },
    Text {
        temp_map: ObjectMap,
        anchor_id: ObjectId,
        text_id: ObjectId,
    },
}

impl ToolKind {
    pub fn selector() -> Self {
        ToolKind::Selector { selected: Vec::new() }
    }

    pub fn selection(&self) -> Option<&[ObjectId]> {
        match self {
            ToolKind::Selector { selected } => Some(selected),
            _ => None,
        }
    }
}

/// Secondary-button drag state, orthogonal to the active tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanState {
    Idle,
    /// `start` is the SVG-space point the pan began at; the running offset
    /// is `start - mouse_point(viewport)` recomputed on every `MouseMove`.
    Panning { start: Point },
}

/// The visible window into data space.
#[derive(Debug, Clone, Copy)]
pub struct ViewBox {
    pub offset: Point,
    pub width: f64,
    pub height: f64,
}

impl Default for ViewBox {
    fn default() -> Self {
        Self {
            offset: Point::ZERO,
            width: 800.0,
            height: 600.0,
        }
    }
}

/// The transient half: nothing here survives a save/load round trip.
#[derive(Debug, Clone)]
pub struct ToolState {
    pub tool: ToolKind,
    pub history: ActionHistory,
    /// Last known mouse position, in viewport coordinates.
    pub mouse_point: Point,
    pub view_box: ViewBox,
    /// Data-space origin's location, expressed in SVG coordinates.
    pub data_origin: Point,
    pub scale: f64,
    pub pan: PanState,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: ToolKind::selector(),
            history: ActionHistory::new(),
            mouse_point: Point::ZERO,
            view_box: ViewBox::default(),
            data_origin: Point::ZERO,
            scale: 1.0,
            pan: PanState::Idle,
        }
    }
}

impl ToolState {
    pub fn mouse_in_data_space(&self) -> Point {
        sketch_render::coords::viewport_to_data(self.mouse_point, self.view_box.offset, self.data_origin)
    }
}
