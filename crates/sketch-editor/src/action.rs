//! Actions: the translator's only output, and the executors' only input.
//!
//! `ToolAction`s mutate `ToolState`; `DataAction`s mutate `DataState`. The
//! split exists so the action-history tree only ever records `DataAction`s —
//! tool-local bookkeeping (mouse position, rubber-banding) has no undo
//! surface and was never meant to have one.

use serde::{Deserialize, Serialize};
use sketch_core::{CanvasObject, Constraint, ObjectId, Point};

use crate::state::{PanState, ToolKind};

/// The only action kind ever written to the history tree or a save file —
/// `ToolAction`s are pure in-session bookkeeping and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DataAction {
    /// Merge a map of newly-created objects into `DataState.objects`.
    AddObject(sketch_core::ObjectMap),
    AddConstraint(Constraint),
}

#[derive(Debug, Clone)]
pub enum ToolAction {
    SetMousePoint(Point),
    SwitchTool(ToolKind),
    SetSelection(Vec<ObjectId>),
    /// Move the Pen tool's rubber-banding tip to a new data-space point.
    PenRubberBand(Point),
    /// Commit the current rubber-band segment into the root path and start a
    /// fresh one: `new_objects` holds the freshly allocated Node + Line,
    /// `committed_point`/`committed_line` are appended to the root path's
    /// `points`/`lines`, and `live` becomes the new rubber-band tip.
    PenExtend {
        new_objects: Vec<CanvasObject>,
        committed_point: ObjectId,
        committed_line: Option<ObjectId>,
        live: crate::state::LiveSubPath,
    },
    TextUpdate { point: Option<Point>, body: Option<String> },
    SetViewOffset(Point),
    ResizeView { width: f64, height: f64 },
    ScaleView(f64),
    SetPan(PanState),
    /// Append a just-executed `DataAction` to the history tree.
    AddHistory(DataAction),
}
