//! Core data model for a sketch document.
//!
//! A sketch is a flat [`ObjectMap`] — no parent/child DAG. Objects refer to
//! each other by [`ObjectId`]; those references are weak (resolved by
//! lookup), never owning, since `Path`s reference `Line`s which reference
//! `Node`s and a shared-ownership graph would make that cycle untenable.

use crate::id::ObjectId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Vector primitives ───────────────────────────────────────────────────

/// A point/vector in the plane. Used for both data-space coordinates and
/// plain 2D arithmetic (the same type serves as `Node.point` and as the
/// result of e.g. `b - a`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const ZERO: Point = Point::new(0.0, 0.0);

    pub fn dot(self, rhs: Point) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Scalar (z-component of the 3D) cross product.
    pub fn cross(self, rhs: Point) -> f64 {
        self.x * rhs.y - self.y * rhs.x
    }

    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

// ─── Canvas objects ───────────────────────────────────────────────────────

/// Common header every canvas object carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObjectHeader {
    pub id: ObjectId,
    /// Guides are displayed in a light stroke, excluded from SVG export, but
    /// otherwise participate in hit-testing and constraints like any object.
    pub guide: bool,
}

/// A free point — the only kind whose coordinates are variables of the
/// constraint solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub header: ObjectHeader,
    pub point: Point,
}

/// A point treated as a solver constant (e.g. the origin guide).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedNode {
    pub header: ObjectHeader,
    pub point: Point,
}

/// A straight segment referencing two `Node`/`FixedNode` endpoints. Carries
/// no coordinates of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub header: ObjectHeader,
    pub point1: ObjectId,
    pub point2: ObjectId,
}

/// An ordered polyline aggregate. `lines[i]` connects `points[i]` to
/// `points[i + 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    pub header: ObjectHeader,
    pub points: Vec<ObjectId>,
    pub lines: Vec<ObjectId>,
}

/// A mathematical expression anchored to a `Node`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub header: ObjectHeader,
    pub anchor: ObjectId,
    pub body: String,
}

/// Tagged sum of every kind of object that can live in an [`ObjectMap`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CanvasObject {
    Node(Node),
    FixedNode(FixedNode),
    Line(Line),
    Path(Path),
    Text(Text),
}

impl CanvasObject {
    pub fn header(&self) -> ObjectHeader {
        match self {
            CanvasObject::Node(n) => n.header,
            CanvasObject::FixedNode(n) => n.header,
            CanvasObject::Line(l) => l.header,
            CanvasObject::Path(p) => p.header,
            CanvasObject::Text(t) => t.header,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.header().id
    }

    pub fn is_guide(&self) -> bool {
        self.header().guide
    }

    /// The object's own coordinate, for the point-like kinds (`Node`,
    /// `FixedNode`). `Line`, `Path`, `Text` have no coordinate of their own.
    pub fn point(&self) -> Option<Point> {
        match self {
            CanvasObject::Node(n) => Some(n.point),
            CanvasObject::FixedNode(n) => Some(n.point),
            _ => None,
        }
    }

    /// IDs this object directly references (its "children" for the purposes
    /// of [`filter_object_map`]).
    pub fn referenced_ids(&self) -> SmallVec<[ObjectId; 4]> {
        match self {
            CanvasObject::Node(_) | CanvasObject::FixedNode(_) => SmallVec::new(),
            CanvasObject::Line(l) => SmallVec::from_slice(&[l.point1, l.point2]),
            CanvasObject::Path(p) => p.points.iter().chain(p.lines.iter()).copied().collect(),
            CanvasObject::Text(t) => SmallVec::from_slice(&[t.anchor]),
        }
    }
}

// ─── Object map ───────────────────────────────────────────────────────────

/// A mapping from [`ObjectId`] to [`CanvasObject`], preserving no order.
///
/// Referential invariant: every ID appearing inside an object keys a live
/// object in the map; `Line` endpoints are `Node` or `FixedNode`; a `Path`'s
/// `lines[i]` is a `Line` whose endpoints match `points[i]` and
/// `points[i + 1]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectMap {
    objects: HashMap<ObjectId, CanvasObject>,
}

impl ObjectMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut CanvasObject> {
        self.objects.get_mut(&id)
    }

    pub fn insert(&mut self, object: CanvasObject) {
        self.objects.insert(object.id(), object);
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<CanvasObject> {
        self.objects.remove(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &CanvasObject)> {
        self.objects.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &CanvasObject> {
        self.objects.values()
    }

    /// Merge `other` into `self`. Right-biased on ID collision — which must
    /// not occur, since IDs are never reused by a live generator.
    pub fn merge(&mut self, other: ObjectMap) {
        self.objects.extend(other.objects);
    }

    /// Resolve a point-like object's coordinate (`Node` or `FixedNode`).
    /// Returns `None` if `id` doesn't key such an object.
    pub fn point_of(&self, id: ObjectId) -> Option<Point> {
        self.get(id).and_then(CanvasObject::point)
    }

    /// Resolve a `Line`'s two endpoints as `ObjectId`s.
    pub fn line_endpoints(&self, id: ObjectId) -> Option<(ObjectId, ObjectId)> {
        match self.get(id)? {
            CanvasObject::Line(l) => Some((l.point1, l.point2)),
            _ => None,
        }
    }
}

/// Retain only `roots` plus the transitive closure of each root's direct
/// children (for a `Path`: its `points` and `lines`). Deletes everything
/// else. Used to prune a Pen tool's scratch map down to the actually
/// committed `Path`.
///
/// Idempotent: applying this twice with the same `roots` yields the same map
/// as applying it once, since the retained set is a fixed point of "roots
/// plus their referenced IDs" once non-roots have been removed.
pub fn filter_object_map(map: &ObjectMap, roots: &[ObjectId]) -> ObjectMap {
    let mut keep: std::collections::HashSet<ObjectId> = roots.iter().copied().collect();
    for &root in roots {
        if let Some(object) = map.get(root) {
            keep.extend(object.referenced_ids());
        }
    }

    let mut result = ObjectMap::new();
    for &id in &keep {
        if let Some(object) = map.get(id) {
            result.insert(object.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, x: f64, y: f64) -> CanvasObject {
        CanvasObject::Node(Node {
            header: ObjectHeader {
                id: ObjectId::from_raw(id),
                guide: false,
            },
            point: Point::new(x, y),
        })
    }

    fn line(id: u64, p1: u64, p2: u64) -> CanvasObject {
        CanvasObject::Line(Line {
            header: ObjectHeader {
                id: ObjectId::from_raw(id),
                guide: false,
            },
            point1: ObjectId::from_raw(p1),
            point2: ObjectId::from_raw(p2),
        })
    }

    #[test]
    fn point_vector_ops() {
        let a = Point::new(1.0, 0.0);
        let b = Point::new(0.0, 1.0);
        assert_eq!(a.dot(b), 0.0);
        assert_eq!(a.cross(b), 1.0);
        assert_eq!(a - b, Point::new(1.0, -1.0));
    }

    #[test]
    fn filter_object_map_keeps_roots_and_children() {
        let mut map = ObjectMap::new();
        map.insert(node(1, 0.0, 0.0));
        map.insert(node(2, 10.0, 0.0));
        map.insert(line(3, 1, 2));
        map.insert(node(99, 5.0, 5.0)); // unrelated node

        let path = CanvasObject::Path(Path {
            header: ObjectHeader {
                id: ObjectId::from_raw(4),
                guide: false,
            },
            points: vec![ObjectId::from_raw(1), ObjectId::from_raw(2)],
            lines: vec![ObjectId::from_raw(3)],
        });
        map.insert(path);

        let filtered = filter_object_map(&map, &[ObjectId::from_raw(4)]);
        assert!(filtered.contains(ObjectId::from_raw(4)));
        assert!(filtered.contains(ObjectId::from_raw(1)));
        assert!(filtered.contains(ObjectId::from_raw(2)));
        assert!(filtered.contains(ObjectId::from_raw(3)));
        assert!(!filtered.contains(ObjectId::from_raw(99)));
        assert_eq!(filtered.len(), 4);
    }

    #[test]
    fn filter_object_map_is_idempotent() {
        let mut map = ObjectMap::new();
        map.insert(node(1, 0.0, 0.0));
        map.insert(node(2, 10.0, 0.0));
        map.insert(line(3, 1, 2));

        let once = filter_object_map(&map, &[ObjectId::from_raw(3)]);
        let twice = filter_object_map(&once, &[ObjectId::from_raw(3)]);
        assert_eq!(once.len(), twice.len());
        for (id, _) in once.iter() {
            assert!(twice.contains(*id));
        }
    }
}
