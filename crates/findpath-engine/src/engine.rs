//! Ticket registry and per-tick dispatch.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use findpath_core::NavMesh;

use crate::config::{EngineConfig, Relaxation};
use crate::error::EngineError;
use crate::pool::{Job, WorkerPool};
use crate::search::Step;
use crate::ticket::{Mode, Ticket, TicketId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dispatch {
    /// Stepped once per update on the host thread.
    Sync,
    /// Waiting for its single hand-off to the pool.
    Queued,
    /// Owned by a worker until it reports completion.
    Submitted,
}

struct Entry {
    ticket: Ticket,
    dispatch: Dispatch,
}

/// Drives path requests against a shared navmesh.
///
/// Call [`update`](Self::update) once per host tick. Synchronous tickets take
/// exactly one search step per call; asynchronous tickets are handed to the
/// worker pool the first time they are seen and reaped once their worker
/// reports back. Terminal tickets leave the registry; the host reads results
/// from its own [`Ticket`] handle.
///
/// Dropping the engine performs the same teardown as [`finish`](Self::finish).
pub struct Engine<M: NavMesh + 'static> {
    mesh: Arc<M>,
    config: EngineConfig,
    pool: Option<WorkerPool>,
    done_tx: Sender<TicketId>,
    done_rx: Receiver<TicketId>,
    completed: HashSet<TicketId>,
    tickets: Vec<Entry>,
    finished: bool,
}

impl<M: NavMesh + 'static> Engine<M> {
    /// Create an engine with `workers` threads. Zero workers means every
    /// ticket is driven synchronously.
    pub fn new(mesh: Arc<M>, workers: usize) -> Result<Self, EngineError> {
        Self::with_config(mesh, EngineConfig::new().with_workers(workers))
    }

    pub fn with_config(mesh: Arc<M>, config: EngineConfig) -> Result<Self, EngineError> {
        let pool = match config.workers {
            0 => None,
            n => Some(WorkerPool::new(n)?),
        };
        let (done_tx, done_rx) = crossbeam_channel::unbounded();
        Ok(Self {
            mesh,
            config,
            pool,
            done_tx,
            done_rx,
            completed: HashSet::new(),
            tickets: Vec::new(),
            finished: false,
        })
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn mesh(&self) -> &Arc<M> {
        &self.mesh
    }

    /// Number of live worker threads.
    pub fn workers(&self) -> usize {
        self.pool.as_ref().map_or(0, WorkerPool::size)
    }

    /// Number of tickets still in the registry.
    #[inline]
    pub fn pending(&self) -> usize {
        self.tickets.len()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Register a ticket. The engine keeps its own handle; the caller's
    /// handle stays valid for polling.
    pub fn add_ticket(&mut self, ticket: &Ticket) -> Result<(), EngineError> {
        if self.finished {
            return Err(EngineError::ShutDown);
        }
        if !ticket.claim() {
            return Err(EngineError::TicketClaimed(ticket.id()));
        }
        let dispatch = match ticket.mode() {
            Mode::Sync => Dispatch::Sync,
            Mode::Async => Dispatch::Queued,
        };
        log::debug!(
            "ticket {} added: {} -> {} ({:?})",
            ticket.id(),
            ticket.start(),
            ticket.goal(),
            ticket.mode()
        );
        self.tickets.push(Entry {
            ticket: ticket.clone(),
            dispatch,
        });
        Ok(())
    }

    /// Advance every registered ticket and drop the terminal ones.
    ///
    /// Returns `true` when no ticket is left pending. That says nothing about
    /// whether any search succeeded; check each ticket's state for that.
    pub fn update(&mut self) -> bool {
        self.completed.extend(self.done_rx.try_iter());

        let mut tickets = std::mem::take(&mut self.tickets);
        tickets.retain_mut(|entry| self.drive(entry));
        // `drive` never registers tickets, so nothing was pushed meanwhile.
        self.tickets = tickets;

        self.tickets.is_empty()
    }

    /// Stop every live ticket, run a final synchronous pass, and join the
    /// workers. Idempotent.
    ///
    /// Afterwards every ticket that was registered is terminal and the
    /// engine rejects new ones.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        log::debug!("finishing engine with {} pending tickets", self.tickets.len());

        for entry in &self.tickets {
            entry.ticket.stop();
        }

        // Tickets that never reached a worker are ours to terminate.
        let mesh = &*self.mesh;
        let relaxation = self.config.relaxation;
        self.tickets.retain(|entry| match entry.dispatch {
            Dispatch::Submitted => true,
            Dispatch::Sync | Dispatch::Queued => {
                step_guarded(&entry.ticket, mesh, relaxation);
                false
            }
        });

        // In-flight workers see the stop flag on their next step.
        if let Some(pool) = self.pool.take() {
            pool.shutdown();
        }

        self.tickets.clear();
        self.completed.clear();
        while self.done_rx.try_recv().is_ok() {}
    }

    /// Returns `true` if the ticket stays registered.
    fn drive(&mut self, entry: &mut Entry) -> bool {
        if entry.dispatch == Dispatch::Queued && self.pool.is_none() {
            log::debug!("ticket {}: no workers, running synchronously", entry.ticket.id());
            entry.dispatch = Dispatch::Sync;
        }

        match entry.dispatch {
            Dispatch::Sync => {
                let step = step_guarded(&entry.ticket, &*self.mesh, self.config.relaxation);
                if step == Step::Finished {
                    log::debug!(
                        "ticket {} {} after {} steps",
                        entry.ticket.id(),
                        entry.ticket.state(),
                        entry.ticket.steps()
                    );
                }
                step == Step::Continue
            }
            Dispatch::Queued => {
                if self.submit(&entry.ticket) {
                    entry.dispatch = Dispatch::Submitted;
                    log::trace!("ticket {} submitted to pool", entry.ticket.id());
                    true
                } else {
                    log::warn!(
                        "ticket {}: worker pool unavailable, running synchronously",
                        entry.ticket.id()
                    );
                    entry.dispatch = Dispatch::Sync;
                    self.drive(entry)
                }
            }
            Dispatch::Submitted => {
                let done = self.completed.remove(&entry.ticket.id());
                if done {
                    log::debug!(
                        "ticket {} {} after {} steps",
                        entry.ticket.id(),
                        entry.ticket.state(),
                        entry.ticket.steps()
                    );
                }
                !done
            }
        }
    }

    /// Queue a job that owns `ticket` until it is terminal.
    fn submit(&self, ticket: &Ticket) -> bool {
        let Some(pool) = &self.pool else {
            return false;
        };
        let ticket = ticket.clone();
        let mesh = Arc::clone(&self.mesh);
        let relaxation = self.config.relaxation;
        let done = self.done_tx.clone();
        let job: Job = Box::new(move || {
            let run = panic::catch_unwind(AssertUnwindSafe(|| ticket.run(&*mesh, relaxation)));
            if run.is_err() {
                log::error!("ticket {}: navmesh panicked, stopping ticket", ticket.id());
                ticket.abort();
            }
            // The engine may already be gone.
            let _ = done.send(ticket.id());
        });
        pool.submit(job).is_ok()
    }
}

/// Take one step on the calling thread. A panicking navmesh stops the ticket
/// instead of unwinding through the registry.
fn step_guarded<M: NavMesh + ?Sized>(ticket: &Ticket, mesh: &M, relaxation: Relaxation) -> Step {
    match panic::catch_unwind(AssertUnwindSafe(|| ticket.step(mesh, relaxation))) {
        Ok(step) => step,
        Err(_) => {
            log::error!("ticket {}: navmesh panicked, stopping ticket", ticket.id());
            ticket.abort();
            Step::Finished
        }
    }
}

impl<M: NavMesh + 'static> Drop for Engine<M> {
    fn drop(&mut self) {
        self.finish();
    }
}
