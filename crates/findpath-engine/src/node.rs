//! Per-ticket node arena: the open and closed lists of one search.
//!
//! Nodes live in a `Vec` and refer to their parent by slot index, so path
//! reconstruction is a plain index walk and no node is shared between
//! tickets. Membership in open or closed is a flag on the node itself, which
//! makes the two lists disjoint by construction.

use std::collections::{BTreeMap, BinaryHeap, HashMap};

use findpath_core::{Cost, NodeId};

/// Index of a node inside its ticket's arena.
pub(crate) type Slot = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum List {
    Open,
    Closed,
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) index: NodeId,
    pub(crate) parent: Option<Slot>,
    pub(crate) g: Cost,
    pub(crate) h: Cost,
    pub(crate) f: Cost,
    /// Filled on first expansion, then reused.
    pub(crate) neighbors: Option<Vec<NodeId>>,
    pub(crate) list: List,
}

/// Read-only view of a search node, as returned by the ticket snapshots.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeInfo {
    pub index: NodeId,
    pub parent: Option<NodeId>,
    pub g: Cost,
    pub h: Cost,
    pub f: Cost,
}

/// Heap entry for the open list, ordered so that `BinaryHeap` pops the
/// lowest `f`, then the lowest `h`, then the earliest discovered slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct OpenRef {
    pub(crate) slot: Slot,
    pub(crate) f: Cost,
    pub(crate) h: Cost,
}

impl Ord for OpenRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.slot.cmp(&self.slot))
    }
}

impl PartialOrd for OpenRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub(crate) struct Arena {
    nodes: Vec<Node>,
    slots: HashMap<NodeId, Slot>,
    // May hold stale entries for nodes whose f was lowered or that were
    // closed; they are skipped on pop.
    heap: BinaryHeap<OpenRef>,
}

impl Arena {
    #[inline]
    pub(crate) fn node(&self, slot: Slot) -> &Node {
        &self.nodes[slot]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, slot: Slot) -> &mut Node {
        &mut self.nodes[slot]
    }

    /// Slot of `index` if it is in either list.
    #[inline]
    pub(crate) fn lookup(&self, index: NodeId) -> Option<Slot> {
        self.slots.get(&index).copied()
    }

    /// Put the root node straight into the closed list.
    pub(crate) fn seed(&mut self, index: NodeId, h: Cost) -> Slot {
        debug_assert!(self.nodes.is_empty(), "arena seeded twice");
        self.push(Node {
            index,
            parent: None,
            g: 0,
            h,
            f: h,
            neighbors: None,
            list: List::Closed,
        })
    }

    pub(crate) fn insert_open(
        &mut self,
        index: NodeId,
        parent: Slot,
        g: Cost,
        h: Cost,
        f: Cost,
    ) -> Slot {
        let slot = self.push(Node {
            index,
            parent: Some(parent),
            g,
            h,
            f,
            neighbors: None,
            list: List::Open,
        });
        self.heap.push(OpenRef { slot, f, h });
        slot
    }

    /// Lower `f` only, leaving parent, `g` and `h` as they were.
    pub(crate) fn lower_f(&mut self, slot: Slot, f: Cost) {
        let node = &mut self.nodes[slot];
        debug_assert!(f < node.f);
        node.f = f;
        if node.list == List::Open {
            let h = node.h;
            self.heap.push(OpenRef { slot, f, h });
        }
    }

    /// Rewrite parent and scores together after finding a cheaper route.
    pub(crate) fn reparent(&mut self, slot: Slot, parent: Slot, g: Cost, h: Cost, f: Cost) {
        let node = &mut self.nodes[slot];
        debug_assert!(f < node.f);
        node.parent = Some(parent);
        node.g = g;
        node.h = h;
        node.f = f;
        if node.list == List::Open {
            self.heap.push(OpenRef { slot, f, h });
        }
    }

    /// Move the best open node to the closed list and return its slot.
    pub(crate) fn pop_best(&mut self) -> Option<Slot> {
        while let Some(entry) = self.heap.pop() {
            let node = &mut self.nodes[entry.slot];
            if node.list != List::Open || node.f != entry.f || node.h != entry.h {
                continue;
            }
            node.list = List::Closed;
            return Some(entry.slot);
        }
        None
    }

    /// Node indices from `slot` back to the root, inclusive.
    pub(crate) fn trace(&self, slot: Slot) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = Some(slot);
        // A parent chain can never be longer than the arena.
        while let Some(s) = cur {
            if out.len() == self.nodes.len() {
                log::warn!("parent chain cycle detected at node {}", self.nodes[s].index);
                break;
            }
            let node = &self.nodes[s];
            out.push(node.index);
            cur = node.parent;
        }
        out
    }

    pub(crate) fn info(&self, slot: Slot) -> NodeInfo {
        let node = &self.nodes[slot];
        NodeInfo {
            index: node.index,
            parent: node.parent.map(|p| self.nodes[p].index),
            g: node.g,
            h: node.h,
            f: node.f,
        }
    }

    /// Snapshot one of the two lists, keyed by node index.
    pub(crate) fn snapshot(&self, list: List) -> BTreeMap<NodeId, NodeInfo> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.list == list)
            .map(|(slot, n)| (n.index, self.info(slot)))
            .collect()
    }

    fn push(&mut self, node: Node) -> Slot {
        let slot = self.nodes.len();
        self.slots.insert(node.index, slot);
        self.nodes.push(node);
        slot
    }
}
