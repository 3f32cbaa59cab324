//! Explicit weighted graph navmesh.

use std::collections::HashMap;

use crate::{Cost, NavMesh, NodeId};

/// A navmesh over an explicit edge list.
///
/// Neighbors are yielded in insertion order. Without an estimate table the
/// heuristic is zero everywhere, which turns the search into a uniform-cost
/// search and is always admissible.
#[derive(Debug, Clone, Default)]
pub struct GraphMesh {
    edges: Vec<Vec<(NodeId, Cost)>>,
    estimates: HashMap<(NodeId, NodeId), Cost>,
}

impl GraphMesh {
    /// A graph with `nodes` isolated nodes.
    pub fn new(nodes: usize) -> Self {
        Self {
            edges: vec![Vec::new(); nodes],
            estimates: HashMap::new(),
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Add a directed edge, growing the node set if needed.
    pub fn add_arc(&mut self, from: NodeId, to: NodeId, cost: Cost) -> &mut Self {
        let needed = from.max(to) + 1;
        if self.edges.len() < needed {
            self.edges.resize(needed, Vec::new());
        }
        self.edges[from].push((to, cost));
        self
    }

    /// Add an edge in both directions.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, cost: Cost) -> &mut Self {
        self.add_arc(a, b, cost).add_arc(b, a, cost)
    }

    /// Record the heuristic for `node` when searching towards `goal`.
    pub fn set_estimate(&mut self, goal: NodeId, node: NodeId, h: Cost) -> &mut Self {
        self.estimates.insert((goal, node), h);
        self
    }
}

impl NavMesh for GraphMesh {
    fn estimate(&self, goal: NodeId, node: NodeId) -> Cost {
        self.estimates.get(&(goal, node)).copied().unwrap_or(0)
    }

    // Non-adjacent pairs have no defined cost; report the cheapest parallel
    // arc if there are several.
    fn cost(&self, from: NodeId, to: NodeId) -> Cost {
        self.edges
            .get(from)
            .into_iter()
            .flatten()
            .filter(|(n, _)| *n == to)
            .map(|&(_, c)| c)
            .min()
            .unwrap_or(Cost::MAX)
    }

    fn neighbors(&self, node: NodeId, buf: &mut Vec<NodeId>) {
        if let Some(edges) = self.edges.get(node) {
            buf.extend(edges.iter().map(|&(n, _)| n));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_and_costs() {
        let mut g = GraphMesh::new(2);
        g.add_edge(0, 1, 3).add_arc(1, 4, 7);
        assert_eq!(g.len(), 5);
        assert_eq!(g.cost(0, 1), 3);
        assert_eq!(g.cost(1, 0), 3);
        assert_eq!(g.cost(1, 4), 7);
        assert_eq!(g.cost(4, 1), Cost::MAX);

        let mut buf = Vec::new();
        g.neighbors(1, &mut buf);
        assert_eq!(buf, vec![0, 4]);
        buf.clear();
        g.neighbors(42, &mut buf);
        assert!(buf.is_empty());
    }

    #[test]
    fn estimate_defaults_to_zero() {
        let mut g = GraphMesh::new(3);
        g.set_estimate(2, 0, 5);
        assert_eq!(g.estimate(2, 0), 5);
        assert_eq!(g.estimate(2, 1), 0);
    }
}
