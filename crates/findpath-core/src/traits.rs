/// Opaque node index handed out by a navmesh.
///
/// The engine never validates these; out-of-range values are the navmesh's
/// problem.
pub type NodeId = usize;

/// Move cost and heuristic unit. Must be non-negative.
pub type Cost = i32;

/// The graph capability a path request is resolved against.
///
/// Several asynchronous searches may share one navmesh from different
/// threads at once, hence the `Send + Sync` bound and `&self` receivers.
pub trait NavMesh: Send + Sync {
    /// Heuristic estimate of the remaining cost from `node` to `goal`.
    /// Must never overestimate the true cost (admissible) for the engine to
    /// return shortest paths.
    fn estimate(&self, goal: NodeId, node: NodeId) -> Cost;

    /// Exact cost of moving from `from` to the adjacent node `to`.
    fn cost(&self, from: NodeId, to: NodeId) -> Cost;

    /// Append the traversable neighbors of `node` into `buf`. The caller
    /// clears `buf` before calling.
    fn neighbors(&self, node: NodeId, buf: &mut Vec<NodeId>);
}

impl<M: NavMesh + ?Sized> NavMesh for &M {
    fn estimate(&self, goal: NodeId, node: NodeId) -> Cost {
        (**self).estimate(goal, node)
    }

    fn cost(&self, from: NodeId, to: NodeId) -> Cost {
        (**self).cost(from, to)
    }

    fn neighbors(&self, node: NodeId, buf: &mut Vec<NodeId>) {
        (**self).neighbors(node, buf)
    }
}
