//! The incremental A* step.
//!
//! [`Search::step`] advances one request by at most one node expansion. The
//! engine calls it once per tick for synchronous tickets; a worker calls it in
//! a loop for asynchronous ones. Either way a given search is only ever
//! stepped from one thread at a time.

use std::collections::BTreeMap;

use findpath_core::{NavMesh, NodeId};

use crate::config::Relaxation;
use crate::node::{Arena, List, NodeInfo, Slot};
use crate::ticket::TicketState;

/// Outcome of one step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// More work remains.
    Continue,
    /// The search reached a terminal state.
    Finished,
}

/// Mutable state of one path request.
#[derive(Debug)]
pub(crate) struct Search {
    start: NodeId,
    goal: NodeId,
    state: TicketState,
    steps: u32,
    arena: Arena,
    current: Option<Slot>,
    path: Vec<NodeId>,
}

impl Search {
    pub(crate) fn new(start: NodeId, goal: NodeId) -> Self {
        Self {
            start,
            goal,
            state: TicketState::Waiting,
            steps: 0,
            arena: Arena::default(),
            current: None,
            path: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn state(&self) -> TicketState {
        self.state
    }

    #[inline]
    pub(crate) fn steps(&self) -> u32 {
        self.steps
    }

    #[inline]
    pub(crate) fn path(&self) -> &[NodeId] {
        &self.path
    }

    pub(crate) fn current(&self) -> Option<NodeId> {
        self.current.map(|s| self.arena.node(s).index)
    }

    pub(crate) fn open_list(&self) -> BTreeMap<NodeId, NodeInfo> {
        self.arena.snapshot(List::Open)
    }

    pub(crate) fn closed_list(&self) -> BTreeMap<NodeId, NodeInfo> {
        self.arena.snapshot(List::Closed)
    }

    /// Force a terminal state without touching the navmesh. No-op if the
    /// search already finished.
    pub(crate) fn abort(&mut self) {
        if !self.state.is_terminal() {
            self.state = TicketState::Stopped;
        }
    }

    /// Advance the search by one expansion.
    ///
    /// `stop` is the cancellation flag sampled by the caller; it is honoured
    /// before any work is done. Calling this on a terminal search changes
    /// nothing and returns [`Step::Finished`].
    pub(crate) fn step<M: NavMesh + ?Sized>(
        &mut self,
        mesh: &M,
        stop: bool,
        relaxation: Relaxation,
    ) -> Step {
        if self.state.is_terminal() {
            return Step::Finished;
        }
        self.state = TicketState::Processing;
        self.steps += 1;

        if stop {
            self.state = TicketState::Stopped;
            return Step::Finished;
        }

        let current = match self.current {
            Some(slot) => slot,
            None => {
                if self.start == self.goal {
                    return self.complete(vec![self.start]);
                }
                let slot = self.arena.seed(self.start, mesh.estimate(self.goal, self.start));
                self.current = Some(slot);
                slot
            }
        };

        // Borrow the cached list out of the arena while relaxing so that
        // new nodes can be pushed; it is put back before returning.
        let cached = self.arena.node_mut(current).neighbors.take();
        let neighbors = match cached {
            Some(cached) => cached,
            None => {
                let mut buf = Vec::new();
                mesh.neighbors(self.arena.node(current).index, &mut buf);
                buf
            }
        };
        let reached_goal = self.relax(current, &neighbors, mesh, relaxation);
        self.arena.node_mut(current).neighbors = Some(neighbors);

        if reached_goal {
            let mut path = vec![self.goal];
            path.extend(self.arena.trace(current));
            return self.complete(path);
        }

        match self.arena.pop_best() {
            Some(next) => {
                self.current = Some(next);
                Step::Continue
            }
            None => {
                // Unreachable goal: best effort is the route to the last
                // expanded node.
                self.path = self.arena.trace(current);
                self.state = TicketState::Stopped;
                Step::Finished
            }
        }
    }

    /// Relax every neighbor of `current`. Returns `true` as soon as the goal
    /// shows up; neighbors after it are left untouched.
    fn relax<M: NavMesh + ?Sized>(
        &mut self,
        current: Slot,
        neighbors: &[NodeId],
        mesh: &M,
        relaxation: Relaxation,
    ) -> bool {
        let (from, from_g) = {
            let node = self.arena.node(current);
            (node.index, node.g)
        };

        for &n in neighbors {
            if n == self.goal {
                return true;
            }

            let edge = mesh.cost(from, n);
            let g = match relaxation {
                Relaxation::FScoreOnly => edge,
                Relaxation::Reparent => from_g.saturating_add(edge),
            };
            let h = mesh.estimate(self.goal, n);
            let f = g.saturating_add(h);

            match self.arena.lookup(n) {
                None => {
                    self.arena.insert_open(n, current, g, h, f);
                }
                Some(slot) if f < self.arena.node(slot).f => match relaxation {
                    Relaxation::FScoreOnly => self.arena.lower_f(slot, f),
                    Relaxation::Reparent => self.arena.reparent(slot, current, g, h, f),
                },
                Some(_) => {}
            }
        }
        false
    }

    fn complete(&mut self, path: Vec<NodeId>) -> Step {
        self.path = path;
        self.state = TicketState::Completed;
        Step::Finished
    }
}

#[cfg(test)]
mod tests {
    use findpath_core::{GraphMesh, GridMesh, Point};

    use super::*;

    fn run(search: &mut Search, mesh: &impl NavMesh, relaxation: Relaxation) {
        while search.step(mesh, false, relaxation) == Step::Continue {}
    }

    /// 0 -1- 1 -1- 2 -1- 3 plus a direct 0 -10- 2 edge; goal 3.
    fn shortcut_graph() -> GraphMesh {
        let mut g = GraphMesh::new(4);
        g.add_edge(0, 1, 1)
            .add_edge(0, 2, 10)
            .add_edge(1, 2, 1)
            .add_edge(2, 3, 1);
        g
    }

    #[test]
    fn first_step_seeds_start_into_closed() {
        let mesh = GridMesh::bordered(8, 8);
        let start = mesh.index(Point::new(1, 1)).unwrap();
        let goal = mesh.index(Point::new(6, 6)).unwrap();
        let mut search = Search::new(start, goal);
        assert_eq!(search.state(), TicketState::Waiting);

        assert_eq!(search.step(&mesh, false, Relaxation::FScoreOnly), Step::Continue);
        assert_eq!(search.state(), TicketState::Processing);
        assert_eq!(search.steps(), 1);

        let closed = search.closed_list();
        assert_eq!(closed.len(), 2);
        let root = closed[&start];
        assert_eq!((root.parent, root.g), (None, 0));
        assert_eq!(root.f, root.h);

        // Best neighbor of the three was popped, the other two wait.
        assert_eq!(search.current(), mesh.index(Point::new(2, 2)));
        assert_eq!(search.open_list().len(), 2);
    }

    #[test]
    fn start_equals_goal() {
        let mesh = GridMesh::new(3, 3);
        let mut search = Search::new(4, 4);
        assert_eq!(search.step(&mesh, false, Relaxation::FScoreOnly), Step::Finished);
        assert_eq!(search.state(), TicketState::Completed);
        assert_eq!(search.path(), &[4]);
        assert_eq!(search.steps(), 1);
        assert!(search.closed_list().is_empty());
    }

    #[test]
    fn stop_flag_wins_over_work() {
        let mesh = GridMesh::new(3, 3);
        let mut search = Search::new(0, 8);
        assert_eq!(search.step(&mesh, true, Relaxation::FScoreOnly), Step::Finished);
        assert_eq!(search.state(), TicketState::Stopped);
        assert_eq!(search.steps(), 1);
        assert!(search.path().is_empty());
    }

    #[test]
    fn terminal_step_is_a_no_op() {
        let mesh = GridMesh::new(3, 3);
        let mut search = Search::new(0, 1);
        run(&mut search, &mesh, Relaxation::FScoreOnly);
        let steps = search.steps();
        let path = search.path().to_vec();

        assert_eq!(search.step(&mesh, false, Relaxation::FScoreOnly), Step::Finished);
        assert_eq!(search.step(&mesh, true, Relaxation::FScoreOnly), Step::Finished);
        assert_eq!(search.steps(), steps);
        assert_eq!(search.path(), path.as_slice());
        assert_eq!(search.state(), TicketState::Completed);
    }

    #[test]
    fn fscore_only_keeps_stale_parent() {
        let mesh = shortcut_graph();
        let mut search = Search::new(0, 3);
        run(&mut search, &mesh, Relaxation::FScoreOnly);

        assert_eq!(search.state(), TicketState::Completed);
        assert_eq!(search.steps(), 3);
        assert_eq!(search.path(), &[3, 2, 0]);

        let node = search.closed_list()[&2];
        assert_eq!(node.parent, Some(0));
        assert_eq!((node.g, node.h, node.f), (10, 0, 1));
    }

    #[test]
    fn reparent_follows_cheaper_route() {
        let mesh = shortcut_graph();
        let mut search = Search::new(0, 3);
        run(&mut search, &mesh, Relaxation::Reparent);

        assert_eq!(search.state(), TicketState::Completed);
        assert_eq!(search.path(), &[3, 2, 1, 0]);

        let node = search.closed_list()[&2];
        assert_eq!(node.parent, Some(1));
        assert_eq!((node.g, node.f), (2, 2));
    }

    #[test]
    fn ties_prefer_earlier_discovery() {
        let mut mesh = GraphMesh::new(10);
        mesh.add_edge(0, 1, 5).add_edge(0, 2, 5);
        let mut search = Search::new(0, 9);
        search.step(&mesh, false, Relaxation::FScoreOnly);
        assert_eq!(search.current(), Some(1));
    }

    #[test]
    fn ties_prefer_lower_estimate() {
        let mut mesh = GraphMesh::new(10);
        mesh.add_edge(0, 1, 2)
            .add_edge(0, 2, 4)
            .set_estimate(9, 1, 3)
            .set_estimate(9, 2, 1);
        let mut search = Search::new(0, 9);
        search.step(&mesh, false, Relaxation::FScoreOnly);
        assert_eq!(search.current(), Some(2));
    }

    #[test]
    fn unreachable_goal_traces_back_to_start() {
        let mut mesh = GraphMesh::new(6);
        mesh.add_edge(0, 1, 1).add_edge(1, 2, 1);
        let mut search = Search::new(0, 5);
        run(&mut search, &mesh, Relaxation::FScoreOnly);

        assert_eq!(search.state(), TicketState::Stopped);
        assert_eq!(search.steps(), 3);
        assert_eq!(search.path(), &[2, 1, 0]);
        assert!(search.open_list().is_empty());
    }

    #[test]
    fn closed_only_grows_and_lists_stay_disjoint() {
        let mesh = GridMesh::parse(
            "\
##########
#........#
#.######.#
#......#.#
##########",
        )
        .unwrap();
        let start = mesh.index(Point::new(1, 3)).unwrap();
        let goal = mesh.index(Point::new(8, 3)).unwrap();
        let mut search = Search::new(start, goal);

        let mut prev_closed = Vec::new();
        loop {
            let step = search.step(&mesh, false, Relaxation::FScoreOnly);
            let open = search.open_list();
            let closed = search.closed_list();
            assert!(open.keys().all(|k| !closed.contains_key(k)));
            assert!(prev_closed.iter().all(|k| closed.contains_key(k)));
            prev_closed = closed.keys().copied().collect();
            if step == Step::Finished {
                break;
            }
        }
        assert_eq!(search.state(), TicketState::Completed);
        assert_eq!(search.path().first(), Some(&goal));
        assert_eq!(search.path().last(), Some(&start));
    }

    #[test]
    fn neighbors_are_cached_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Counting {
            inner: GridMesh,
            calls: AtomicUsize,
        }

        impl NavMesh for Counting {
            fn estimate(&self, goal: NodeId, node: NodeId) -> i32 {
                self.inner.estimate(goal, node)
            }
            fn cost(&self, from: NodeId, to: NodeId) -> i32 {
                self.inner.cost(from, to)
            }
            fn neighbors(&self, node: NodeId, buf: &mut Vec<NodeId>) {
                self.calls.fetch_add(1, Ordering::Relaxed);
                self.inner.neighbors(node, buf)
            }
        }

        let mesh = Counting {
            inner: GridMesh::bordered(8, 8),
            calls: AtomicUsize::new(0),
        };
        let mut search = Search::new(9, 54);
        run(&mut search, &mesh, Relaxation::FScoreOnly);
        assert_eq!(search.state(), TicketState::Completed);
        assert_eq!(mesh.calls.load(Ordering::Relaxed) as u32, search.steps());
    }
}
