//! Arena-backed composite tree of package components.
//!
//! Leaves carry a fixed weight, containers carry a fixed overhead and
//! aggregate the weight of everything below them. Parent links are arena
//! handles, so the tree never owns itself in reverse.
//!
//! The permissive wiring calls (`add`, `remove`) do not validate their input.
//! Attaching a node under two parents or under its own descendant is caller
//! error; `try_add` is the checked alternative. Aggregation assumes an acyclic
//! tree and recurses once per level.

use std::fmt;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::{debug, instrument, warn};

use crate::domain::error::{DomainError, DomainResult};

/// Weight of a single nail.
pub const NAIL_WEIGHT: u64 = 5;

/// Weight of an empty nail box.
pub const NAIL_BOX_WEIGHT: u64 = 1;

/// Leaf or container, with the node's own fixed weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Leaf { weight: u64 },
    Container { overhead: u64 },
}

impl Component {
    pub fn own_weight(&self) -> u64 {
        match *self {
            Component::Leaf { weight } => weight,
            Component::Container { overhead } => overhead,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Component::Container { .. })
    }
}

/// Data payload for package nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Display name
    pub label: String,
    pub component: Component,
}

impl NodeData {
    pub fn leaf(label: impl Into<String>, weight: u64) -> Self {
        Self {
            label: label.into(),
            component: Component::Leaf { weight },
        }
    }

    pub fn container(label: impl Into<String>, overhead: u64) -> Self {
        Self {
            label: label.into(),
            component: Component::Container { overhead },
        }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Tree node in the arena.
#[derive(Debug)]
pub struct PackageNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None while detached
    pub parent: Option<Index>,
    /// Indices of child nodes in insertion order
    pub children: Vec<Index>,
}

/// Arena holding any number of package trees.
///
/// Nodes are inserted detached and wired together with [`PackageArena::add`].
/// A node without a parent is a root.
#[derive(Debug)]
pub struct PackageArena {
    arena: Arena<PackageNode>,
}

impl Default for PackageArena {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, data: NodeData) -> Index {
        self.arena.insert(PackageNode {
            data,
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn insert_leaf(&mut self, label: impl Into<String>, weight: u64) -> Index {
        self.insert(NodeData::leaf(label, weight))
    }

    pub fn insert_container(&mut self, label: impl Into<String>, overhead: u64) -> Index {
        self.insert(NodeData::container(label, overhead))
    }

    pub fn insert_nail(&mut self) -> Index {
        self.insert_leaf("nail", NAIL_WEIGHT)
    }

    pub fn insert_nail_box(&mut self) -> Index {
        self.insert_container("nail box", NAIL_BOX_WEIGHT)
    }

    pub fn get_node(&self, idx: Index) -> Option<&PackageNode> {
        self.arena.get(idx)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.get_node(idx).and_then(|node| node.parent)
    }

    /// Children of `idx`, empty for leaves and unknown handles.
    pub fn children(&self, idx: Index) -> &[Index] {
        self.get_node(idx)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// All detached nodes, in arena order.
    pub fn roots(&self) -> Vec<Index> {
        self.arena
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Attaches `child` under `parent` and points the child back at it.
    ///
    /// A leaf parent ignores the call, as does an unknown handle.
    #[instrument(level = "debug", skip(self))]
    pub fn add(&mut self, parent: Index, child: Index) {
        match self.arena.get(parent) {
            Some(node) if node.data.component.is_container() => {}
            Some(node) => {
                debug!(parent = %node.data, "leaf ignores add");
                return;
            }
            None => {
                warn!("add on unknown parent");
                return;
            }
        }
        if !self.arena.contains(child) {
            warn!("add of unknown child");
            return;
        }

        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Checked form of [`PackageArena::add`].
    #[instrument(level = "debug", skip(self))]
    pub fn try_add(&mut self, parent: Index, child: Index) -> DomainResult<()> {
        let parent_node = self
            .get_node(parent)
            .ok_or(DomainError::NodeNotFound(parent))?;
        if !parent_node.data.component.is_container() {
            return Err(DomainError::NotAContainer(parent_node.data.label.clone()));
        }
        let child_node = self
            .get_node(child)
            .ok_or(DomainError::NodeNotFound(child))?;
        if child_node.parent.is_some() {
            return Err(DomainError::AlreadyAttached(child_node.data.label.clone()));
        }
        if self.iter_from(child).any(|(idx, _)| idx == parent) {
            return Err(DomainError::CycleDetected(child_node.data.label.clone()));
        }

        self.add(parent, child);
        Ok(())
    }

    /// Detaches the first occurrence of `child` from `parent` and clears its parent link.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, parent: Index, child: Index) {
        let removed = match self.arena.get_mut(parent) {
            Some(node) => match node.children.iter().position(|&c| c == child) {
                Some(pos) => {
                    node.children.remove(pos);
                    true
                }
                None => false,
            },
            None => false,
        };

        if removed {
            if let Some(node) = self.arena.get_mut(child) {
                node.parent = None;
            }
        } else {
            debug!("remove of non-child ignored");
        }
    }

    /// Aggregated weight of the subtree rooted at `idx`.
    ///
    /// Fails for an unknown handle, or when the total does not fit in a `u64`.
    #[instrument(level = "debug", skip(self))]
    pub fn weight(&self, idx: Index) -> DomainResult<u64> {
        if self.get_node(idx).is_none() {
            return Err(DomainError::NodeNotFound(idx));
        }
        self.aggregate(idx)
    }

    fn aggregate(&self, idx: Index) -> DomainResult<u64> {
        let Some(node) = self.get_node(idx) else {
            return Ok(0);
        };
        match node.data.component {
            Component::Leaf { weight } => Ok(weight),
            Component::Container { overhead } => {
                node.children.iter().try_fold(overhead, |total, &child| {
                    total
                        .checked_add(self.aggregate(child)?)
                        .ok_or_else(|| DomainError::WeightOverflow(node.data.label.clone()))
                })
            }
        }
    }

    /// Number of levels in the subtree rooted at `idx`; 0 for an unknown handle.
    pub fn depth(&self, idx: Index) -> usize {
        if let Some(node) = self.get_node(idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Pre-order traversal starting at `idx`.
    pub fn iter_from(&self, idx: Index) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, idx)
    }

    /// Renders the subtree as `label (weight)` lines; an overflowing total shows as `overflow`.
    pub fn to_tree_string(&self, idx: Index) -> Tree<String> {
        match self.get_node(idx) {
            Some(node) => {
                let leaves: Vec<_> = node
                    .children
                    .iter()
                    .map(|&child| self.to_tree_string(child))
                    .collect();
                let weight = match self.aggregate(idx) {
                    Ok(weight) => weight.to_string(),
                    Err(_) => "overflow".to_string(),
                };
                Tree::new(format!("{} ({})", node.data, weight)).with_leaves(leaves)
            }
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

pub struct PreOrderIterator<'a> {
    arena: &'a PackageArena,
    stack: Vec<Index>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(arena: &'a PackageArena, start: Index) -> Self {
        let mut stack = Vec::new();
        if arena.get_node(start).is_some() {
            stack.push(start);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a PackageNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Reverse push keeps left-to-right order
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
