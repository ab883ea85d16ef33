//! Action history as an append-only tree, not an undo/redo stack.
//!
//! Every `DataAction` the data executor actually applies gets appended as a
//! child of the current node, and `cur` advances to the new child — there is
//! no `undo`. Branching happens when a load replays a prefix and new actions
//! diverge from what the tree already recorded; nothing is ever discarded,
//! so a branch just means `cur` now has more than one child. Persistence
//! only ever replays `children[0]` at each level, i.e. the first branch taken
//! historically, so the tree doubles as an append-only log without losing
//! whatever was explored down other branches in memory.

use crate::action::DataAction;

pub struct HistoryNode {
    pub action: DataAction,
    pub children: Vec<HistoryNode>,
}

/// Indexes a node by the path of child indices from the root.
pub type NodePath = Vec<usize>;

pub struct ActionHistory {
    root: Option<HistoryNode>,
    cur: NodePath,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self { root: None, cur: Vec::new() }
    }

    /// Record `action` as a new child of the current node and advance `cur`
    /// to it.
    pub fn append(&mut self, action: DataAction) {
        let node = HistoryNode { action, children: Vec::new() };
        match &mut self.root {
            None => {
                self.root = Some(node);
                self.cur = Vec::new();
            }
            Some(root) => {
                let parent = Self::node_at_mut(root, &self.cur);
                let index = parent.children.len();
                parent.children.push(node);
                self.cur.push(index);
            }
        }
    }

    fn node_at_mut<'a>(root: &'a mut HistoryNode, path: &[usize]) -> &'a mut HistoryNode {
        let mut node = root;
        for &index in path {
            node = &mut node.children[index];
        }
        node
    }

    pub fn root(&self) -> Option<&HistoryNode> {
        self.root.as_ref()
    }

    /// Pre-order walk of every action ever appended, in the order it was
    /// appended. Used for serialization — the tree's branching is lost on
    /// this path; only replay (`children[0]` at every level) reconstructs
    /// the primary timeline.
    pub fn serialize_preorder(&self) -> Vec<&DataAction> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            Self::walk(root, &mut out);
        }
        out
    }

    fn walk<'a>(node: &'a HistoryNode, out: &mut Vec<&'a DataAction>) {
        out.push(&node.action);
        for child in &node.children {
            Self::walk(child, out);
        }
    }

    /// The primary timeline: `root`, then `children[0]` at every subsequent
    /// level, down to a leaf. This is what a `Load` replays.
    pub fn primary_timeline(&self) -> Vec<&DataAction> {
        let mut out = Vec::new();
        let mut node = match &self.root {
            Some(n) => n,
            None => return out,
        };
        loop {
            out.push(&node.action);
            match node.children.first() {
                Some(child) => node = child,
                None => break,
            }
        }
        out
    }
}

impl Default for ActionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActionHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionHistory")
            .field("len", &self.serialize_preorder().len())
            .field("cur_depth", &self.cur.len())
            .finish()
    }
}

impl Clone for ActionHistory {
    /// Deep-clones the tree. `ToolState` derives `Clone` for test fixtures;
    /// the history itself is otherwise append-only and never cloned in the
    /// live event path.
    fn clone(&self) -> Self {
        fn clone_node(node: &HistoryNode) -> HistoryNode {
            HistoryNode {
                action: node.action.clone(),
                children: node.children.iter().map(clone_node).collect(),
            }
        }
        Self {
            root: self.root.as_ref().map(clone_node),
            cur: self.cur.clone(),
        }
    }
}
