//! Arena-backed dataflow forest
//!
//! Nodes live in a `Vec` and are addressed by [`NodeId`]. Each node owns the
//! ordered list of its children; the parent link is a plain index used for
//! navigation. Removed nodes stay in the arena, detached, until the graph is
//! dropped.

use super::node::{NodeKind, NodeTag};
use crate::error::{CompileError, Result};
use std::fmt;

/// Stable index of a node in a [`DataflowGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

/// Forest of dataflow nodes
#[derive(Debug, Clone, Default)]
pub struct DataflowGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    /// Bumped by every structural change
    revision: u64,
}

impl DataflowGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node as a new root
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
            attached: true,
        });
        self.roots.push(id);
        self.revision += 1;
        id
    }

    /// Add a node as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId> {
        let id = self.add(kind);
        self.set_parent(id, parent)?;
        Ok(id)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn tag(&self, id: NodeId) -> NodeTag {
        self.kind(id).tag()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Root nodes in insertion order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Whether the node is still part of the forest
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.nodes[id.index()].attached
    }

    /// Number of attached nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.attached).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Root of the tree containing `id`
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Whether `ancestor` lies on the path from `id` to its root
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// All leaves, depth first, in child order
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let children = self.children(id);
            if children.is_empty() {
                leaves.push(id);
            } else {
                stack.extend(children.iter().rev().copied());
            }
        }
        leaves
    }

    /// All attached nodes, depth first, in child order
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Detach `id` from its current position and append it to `parent`'s children
    pub fn set_parent(&mut self, id: NodeId, parent: NodeId) -> Result<()> {
        if id == parent || self.is_ancestor(id, parent) {
            return Err(CompileError::InvalidGraphOperation(format!(
                "reparenting {} under {} would create a cycle",
                id, parent
            )));
        }
        if !self.is_attached(parent) {
            return Err(CompileError::InvalidGraphOperation(format!(
                "cannot attach {} to removed node {}",
                id, parent
            )));
        }

        self.detach(id);
        self.nodes[parent.index()].children.push(id);
        let node = &mut self.nodes[id.index()];
        node.parent = Some(parent);
        node.attached = true;
        self.revision += 1;
        Ok(())
    }

    /// Splice a node out of the forest.
    ///
    /// Its children take its place in the parent's child list (or among the
    /// roots), in their original order.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if !self.is_attached(id) {
            return Err(CompileError::InvalidGraphOperation(format!(
                "{} was already removed",
                id
            )));
        }

        let parent = self.parent(id);
        let children = std::mem::take(&mut self.nodes[id.index()].children);
        for child in &children {
            self.nodes[child.index()].parent = parent;
        }

        let siblings = match parent {
            Some(p) => &mut self.nodes[p.index()].children,
            None => &mut self.roots,
        };
        if let Some(pos) = siblings.iter().position(|&c| c == id) {
            siblings.splice(pos..=pos, children);
        }

        let node = &mut self.nodes[id.index()];
        node.parent = None;
        node.attached = false;
        self.revision += 1;
        Ok(())
    }

    /// Exchange positions of `id` and its parent.
    ///
    /// `id` must be the parent's only child. It takes the parent's slot, the
    /// parent becomes its only child and adopts `id`'s former children.
    pub fn swap_with_parent(&mut self, id: NodeId) -> Result<()> {
        let parent = self.parent(id).ok_or_else(|| {
            CompileError::InvalidGraphOperation(format!("{} has no parent to swap with", id))
        })?;
        if self.children(parent) != [id] {
            return Err(CompileError::InvalidGraphOperation(format!(
                "{} is not the only child of {}",
                id, parent
            )));
        }

        let grandparent = self.parent(parent);
        let siblings = match grandparent {
            Some(g) => &mut self.nodes[g.index()].children,
            None => &mut self.roots,
        };
        if let Some(slot) = siblings.iter_mut().find(|c| **c == parent) {
            *slot = id;
        }

        let grandchildren = std::mem::take(&mut self.nodes[id.index()].children);
        for child in &grandchildren {
            self.nodes[child.index()].parent = Some(parent);
        }

        let node = &mut self.nodes[id.index()];
        node.parent = grandparent;
        node.children = vec![parent];

        let old_parent = &mut self.nodes[parent.index()];
        old_parent.parent = Some(id);
        old_parent.children = grandchildren;

        self.revision += 1;
        Ok(())
    }

    /// Absorb `other`'s payload into `keep`, then remove `other`
    pub fn merge(&mut self, keep: NodeId, other: NodeId) -> Result<()> {
        if keep == other {
            return Err(CompileError::InvalidGraphOperation(format!(
                "cannot merge {} into itself",
                keep
            )));
        }
        let payload = self.kind(other).clone();
        self.kind_mut(keep).merge(payload)?;
        self.remove(other)
    }

    /// Indented dump of the forest, one node per line
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.render_node(root, 0, &mut out);
        }
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{} {}\n", id, self.kind(id).label()));
        for &child in self.children(id) {
            self.render_node(child, depth + 1, out);
        }
    }

    fn detach(&mut self, id: NodeId) {
        if !self.is_attached(id) {
            return;
        }
        let siblings = match self.parent(id) {
            Some(p) => &mut self.nodes[p.index()].children,
            None => &mut self.roots,
        };
        siblings.retain(|&c| c != id);
        self.nodes[id.index()].parent = None;
    }
}
