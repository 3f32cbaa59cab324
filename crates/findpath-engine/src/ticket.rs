//! Path requests and their state machine.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use findpath_core::{NavMesh, NodeId};
use parking_lot::Mutex;

use crate::config::Relaxation;
use crate::node::NodeInfo;
use crate::search::{Search, Step};

/// Process-unique ticket identifier, used in logs and errors.
pub type TicketId = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a ticket: `Waiting → Processing → {Completed, Stopped}`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TicketState {
    /// Not stepped yet.
    #[default]
    Waiting,
    /// At least one step done, no result yet.
    Processing,
    /// The goal was reached; the found path runs goal to start.
    Completed,
    /// Cancelled, or the goal is unreachable. The found path is a
    /// best-effort trace and may be empty.
    Stopped,
}

impl TicketState {
    /// Whether no further step will change this ticket.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Waiting => "waiting",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
        })
    }
}

/// How a ticket wants to be driven.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// One step per [`Engine::update`](crate::Engine::update) call, on the
    /// calling thread.
    #[default]
    Sync,
    /// Run to completion on a pool worker. Falls back to `Sync` when the
    /// engine has no workers.
    Async,
}

struct Shared {
    id: TicketId,
    start: NodeId,
    goal: NodeId,
    mode: Mode,
    stop: AtomicBool,
    claimed: AtomicBool,
    search: Mutex<Search>,
}

/// A path request from `start` to `goal` and its search state.
///
/// `Ticket` is a cheap handle: clones share the same request. The host keeps
/// one clone to poll while the engine (or one of its workers) drives another.
/// Every accessor takes the ticket's lock briefly, so snapshots never observe
/// a half-applied step.
#[derive(Clone)]
pub struct Ticket {
    shared: Arc<Shared>,
}

impl Ticket {
    pub fn new(start: NodeId, goal: NodeId, mode: Mode) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                start,
                goal,
                mode,
                stop: AtomicBool::new(false),
                claimed: AtomicBool::new(false),
                search: Mutex::new(Search::new(start, goal)),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> TicketId {
        self.shared.id
    }

    #[inline]
    pub fn start(&self) -> NodeId {
        self.shared.start
    }

    #[inline]
    pub fn goal(&self) -> NodeId {
        self.shared.goal
    }

    /// The requested mode. The engine may still drive an `Async` ticket
    /// synchronously if it has no workers.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.shared.mode
    }

    pub fn state(&self) -> TicketState {
        self.shared.search.lock().state()
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u32 {
        self.shared.search.lock().steps()
    }

    /// The result path, goal first and start last.
    ///
    /// Empty until the ticket is terminal. For a [`TicketState::Stopped`]
    /// ticket it is a best-effort trace from the last expanded node, or empty
    /// if the ticket was cancelled.
    pub fn found_path(&self) -> Vec<NodeId> {
        self.shared.search.lock().path().to_vec()
    }

    /// Snapshot of the nodes discovered but not yet expanded.
    pub fn open_list(&self) -> BTreeMap<NodeId, NodeInfo> {
        self.shared.search.lock().open_list()
    }

    /// Snapshot of the nodes already expanded.
    pub fn closed_list(&self) -> BTreeMap<NodeId, NodeInfo> {
        self.shared.search.lock().closed_list()
    }

    /// The node being expanded next, once the search has started.
    pub fn current(&self) -> Option<NodeId> {
        self.shared.search.lock().current()
    }

    /// Request cancellation. Takes effect at the start of the next step.
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.shared.stop.load(Ordering::Acquire)
    }

    /// Mark the ticket as owned by an engine. Returns `false` if some engine
    /// already owns it.
    pub(crate) fn claim(&self) -> bool {
        self.shared
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn step<M: NavMesh + ?Sized>(&self, mesh: &M, relaxation: Relaxation) -> Step {
        let stop = self.stop_requested();
        self.shared.search.lock().step(mesh, stop, relaxation)
    }

    /// Step until terminal. The lock is released between steps so the host
    /// can keep polling.
    pub(crate) fn run<M: NavMesh + ?Sized>(&self, mesh: &M, relaxation: Relaxation) {
        while self.step(mesh, relaxation) == Step::Continue {}
    }

    pub(crate) fn abort(&self) {
        self.shared.search.lock().abort();
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket")
            .field("id", &self.shared.id)
            .field("start", &self.shared.start)
            .field("goal", &self.shared.goal)
            .field("mode", &self.shared.mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use findpath_core::GridMesh;

    use super::*;

    #[test]
    fn new_ticket_is_waiting() {
        let t = Ticket::new(3, 7, Mode::Async);
        assert_eq!(t.state(), TicketState::Waiting);
        assert_eq!((t.start(), t.goal(), t.mode()), (3, 7, Mode::Async));
        assert_eq!(t.steps(), 0);
        assert!(t.found_path().is_empty());
        assert!(t.open_list().is_empty());
        assert!(t.closed_list().is_empty());
        assert_eq!(t.current(), None);
        assert!(!t.is_terminal());
    }

    #[test]
    fn ids_are_unique() {
        let a = Ticket::new(0, 1, Mode::Sync);
        let b = Ticket::new(0, 1, Mode::Sync);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn claim_is_exactly_once() {
        let t = Ticket::new(0, 1, Mode::Sync);
        assert!(t.claim());
        assert!(!t.clone().claim());
    }

    #[test]
    fn clones_share_state() {
        let mesh = GridMesh::new(4, 4);
        let t = Ticket::new(0, 15, Mode::Sync);
        let handle = t.clone();
        t.run(&mesh, Relaxation::FScoreOnly);
        assert_eq!(handle.state(), TicketState::Completed);
        assert_eq!(handle.found_path(), t.found_path());
        assert_eq!(handle.found_path().first(), Some(&15));
        assert_eq!(handle.found_path().last(), Some(&0));
    }

    #[test]
    fn stop_is_observed_on_next_step() {
        let mesh = GridMesh::new(16, 16);
        let t = Ticket::new(0, 255, Mode::Sync);
        assert_eq!(t.step(&mesh, Relaxation::FScoreOnly), Step::Continue);
        t.stop();
        assert!(t.stop_requested());
        assert_eq!(t.step(&mesh, Relaxation::FScoreOnly), Step::Finished);
        assert_eq!(t.state(), TicketState::Stopped);
        assert_eq!(t.steps(), 2);
    }

    #[test]
    fn abort_keeps_completed_result() {
        let t = Ticket::new(5, 5, Mode::Sync);
        t.run(&GridMesh::new(4, 4), Relaxation::FScoreOnly);
        t.abort();
        assert_eq!(t.state(), TicketState::Completed);
        assert_eq!(t.found_path(), vec![5]);
    }

    #[test]
    fn state_display() {
        assert_eq!(TicketState::Completed.to_string(), "completed");
        assert!(TicketState::Stopped.is_terminal());
        assert!(!TicketState::Processing.is_terminal());
    }
}
