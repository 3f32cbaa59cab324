//! Incremental A* path-request engine.
//!
//! A host submits [`Ticket`]s to an [`Engine`] and calls
//! [`Engine::update`] once per tick. Synchronous tickets advance by exactly
//! one node expansion per update, so search cost is spread across frames;
//! asynchronous tickets are handed once to a fixed worker pool and run to
//! completion there. The host polls its own ticket handle for the state and
//! the found path.
//!
//! ```no_run
//! use std::sync::Arc;
//! use findpath_core::{GridMesh, Point};
//! use findpath_engine::{Engine, Mode, Ticket, TicketState};
//!
//! let mesh = Arc::new(GridMesh::bordered(8, 8));
//! let start = mesh.index(Point::new(1, 1)).unwrap();
//! let goal = mesh.index(Point::new(6, 6)).unwrap();
//!
//! let mut engine = Engine::new(Arc::clone(&mesh), 2).unwrap();
//! let ticket = Ticket::new(start, goal, Mode::Async);
//! engine.add_ticket(&ticket).unwrap();
//! while !engine.update() {}
//! assert_eq!(ticket.state(), TicketState::Completed);
//! ```
//!
//! Optimality holds only if the navmesh heuristic is admissible and
//! [`Relaxation::Reparent`] is selected; the default
//! [`Relaxation::FScoreOnly`] reproduces the classic engine behavior.

mod config;
mod engine;
mod error;
mod node;
mod pool;
mod search;
mod ticket;

pub use config::{EngineConfig, Relaxation};
pub use engine::Engine;
pub use error::EngineError;
pub use node::NodeInfo;
pub use ticket::{Mode, Ticket, TicketId, TicketState};

pub use findpath_core::{Cost, NavMesh, NodeId};
