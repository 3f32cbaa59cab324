use std::fmt;
use std::io;

use crate::TicketId;

/// Errors returned by the [`Engine`](crate::Engine) surface.
///
/// An unreachable goal is not an error; it shows up as
/// [`TicketState::Stopped`](crate::TicketState::Stopped).
#[derive(Debug)]
pub enum EngineError {
    /// A worker thread could not be started.
    Spawn(io::Error),
    /// The ticket is already registered with an engine.
    TicketClaimed(TicketId),
    /// The engine has been finished and accepts no more tickets.
    ShutDown,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to spawn worker thread: {e}"),
            Self::TicketClaimed(id) => write!(f, "ticket {id} is already registered"),
            Self::ShutDown => f.write_str("engine is shut down"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(e: io::Error) -> Self {
        Self::Spawn(e)
    }
}
