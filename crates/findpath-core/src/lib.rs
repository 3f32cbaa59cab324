//! **findpath-core**: the navmesh side of the findpath engine.
//!
//! The engine never looks inside a navmesh; it only calls the three
//! operations of [`NavMesh`] on opaque [`NodeId`]s. This crate defines that
//! capability and ships two reference implementations:
//!
//! - [`GridMesh`]: a rectangular grid with a collision layer, 8-way or 4-way
//!   movement, octile/Manhattan heuristics.
//! - [`GraphMesh`]: an explicit weighted edge list for arbitrary graphs.

mod distance;
mod geom;
mod graph;
mod grid;
mod traits;

pub use distance::{chebyshev, manhattan, octile};
pub use geom::Point;
pub use graph::GraphMesh;
pub use grid::{DIAGONAL_COST, GridMesh, MeshError, Movement, STRAIGHT_COST};
pub use traits::{Cost, NavMesh, NodeId};
