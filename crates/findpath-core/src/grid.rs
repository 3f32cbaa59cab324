//! Rectangular grid navmesh with a collision layer.
//!
//! Cells are addressed by flat row-major indices (`y * width + x`), which is
//! what the engine sees as [`NodeId`]s. Blocked cells are never yielded as
//! neighbors; a blocked goal is therefore unreachable.

use std::fmt;

use crate::distance::{manhattan, octile};
use crate::{Cost, NavMesh, NodeId, Point};

/// Cost of a cardinal step.
pub const STRAIGHT_COST: Cost = 10;
/// Cost of a diagonal step.
pub const DIAGONAL_COST: Cost = 14;

/// Allowed movement directions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Movement {
    /// Cardinal only; Manhattan heuristic.
    Four,
    /// Cardinal and diagonal; octile heuristic.
    #[default]
    Eight,
}

/// A grid navmesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMesh {
    width: i32,
    height: i32,
    blocked: Vec<bool>,
    movement: Movement,
}

impl GridMesh {
    /// An all-free grid with 8-way movement.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            blocked: vec![false; width as usize * height as usize],
            movement: Movement::Eight,
        }
    }

    /// A grid whose outermost ring of cells is blocked.
    pub fn bordered(width: i32, height: i32) -> Self {
        let mut mesh = Self::new(width, height);
        for y in 0..mesh.height {
            for x in 0..mesh.width {
                if x == 0 || y == 0 || x == mesh.width - 1 || y == mesh.height - 1 {
                    mesh.set_blocked(Point::new(x, y), true);
                }
            }
        }
        mesh
    }

    /// Parse an ASCII map: `#` is blocked, `.` is free.
    ///
    /// Every line must have the same width. Leading/trailing whitespace is
    /// trimmed from the whole string but not from individual lines. CRLF line
    /// endings are accepted.
    pub fn parse(s: &str) -> Result<Self, MeshError> {
        let s = s.trim();
        let mut blocked = Vec::with_capacity(s.len());
        let mut x: i32 = 0;
        let mut y: i32 = 0;
        let mut w: i32 = -1;

        for ch in s.chars() {
            match ch {
                '\n' => {
                    if w >= 0 && x != w {
                        return Err(MeshError::InconsistentSize(s.to_string()));
                    }
                    w = x;
                    x = 0;
                    y += 1;
                    continue;
                }
                '\r' => continue,
                '#' => blocked.push(true),
                '.' => blocked.push(false),
                _ => {
                    return Err(MeshError::InvalidRune {
                        ch,
                        pos: Point::new(x, y),
                    });
                }
            }
            x += 1;
        }
        if w >= 0 && x != w {
            return Err(MeshError::InconsistentSize(s.to_string()));
        }
        let height = if blocked.is_empty() { 0 } else { y + 1 };
        Ok(Self {
            width: x,
            height,
            blocked,
            movement: Movement::Eight,
        })
    }

    /// Switch the movement model.
    pub fn with_movement(mut self, movement: Movement) -> Self {
        self.movement = movement;
        self
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn movement(&self) -> Movement {
        self.movement
    }

    /// Whether `p` lies inside the grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// Flat index of `p`, or `None` if it lies outside the grid.
    #[inline]
    pub fn index(&self, p: Point) -> Option<NodeId> {
        if !self.contains(p) {
            return None;
        }
        Some(p.y as usize * self.width as usize + p.x as usize)
    }

    /// Point for a flat index. Indices past the end map outside the grid.
    #[inline]
    pub fn point(&self, idx: NodeId) -> Point {
        if self.width == 0 {
            return Point::ZERO;
        }
        let width = self.width as usize;
        Point::new((idx % width) as i32, (idx / width) as i32)
    }

    /// Whether `p` is blocked. Points outside the grid count as blocked.
    pub fn is_blocked(&self, p: Point) -> bool {
        match self.index(p) {
            Some(i) => self.blocked[i],
            None => true,
        }
    }

    /// Mark `p` blocked or free. Ignored outside the grid.
    pub fn set_blocked(&mut self, p: Point, blocked: bool) {
        if let Some(i) = self.index(p) {
            self.blocked[i] = blocked;
        }
    }
}

impl NavMesh for GridMesh {
    fn estimate(&self, goal: NodeId, node: NodeId) -> Cost {
        let (g, n) = (self.point(goal), self.point(node));
        match self.movement {
            Movement::Four => STRAIGHT_COST * manhattan(g, n),
            Movement::Eight => octile(g, n, STRAIGHT_COST, DIAGONAL_COST),
        }
    }

    fn cost(&self, from: NodeId, to: NodeId) -> Cost {
        let d = self.point(to) - self.point(from);
        match d.x.abs() + d.y.abs() {
            0 => 0,
            1 => STRAIGHT_COST,
            _ => DIAGONAL_COST,
        }
    }

    fn neighbors(&self, node: NodeId, buf: &mut Vec<NodeId>) {
        let p = self.point(node);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if self.movement == Movement::Four && dx != 0 && dy != 0 {
                    continue;
                }
                let n = p.shift(dx, dy);
                if let Some(i) = self.index(n) {
                    if !self.blocked[i] {
                        buf.push(i);
                    }
                }
            }
        }
    }
}

/// Errors that can occur when parsing an ASCII grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Lines have inconsistent widths.
    InconsistentSize(String),
    /// A character other than `#` or `.` was found.
    InvalidRune { ch: char, pos: Point },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InconsistentSize(s) => write!(f, "grid: inconsistent size:\n{s}"),
            Self::InvalidRune { ch, pos } => {
                write!(f, "grid contains invalid rune {ch:?} at {pos}")
            }
        }
    }
}

impl std::error::Error for MeshError {}
