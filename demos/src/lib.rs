//! Shared helpers for the demo binaries: cave generation and ASCII output.

use findpath_core::{GridMesh, NodeId, Point};
use rand::{Rng, RngExt, SeedableRng};

/// Smoothing rule: a cell becomes a wall when at least this many of its
/// eight neighbors are walls.
const WALL_CUTOFF: usize = 5;

/// Generate a bordered cave with cellular automata.
///
/// Each interior cell starts as a wall with probability `wall_pct`, then
/// `reps` smoothing passes are applied. The same `seed` always produces the
/// same cave.
pub fn cave(width: i32, height: i32, wall_pct: f64, reps: usize, seed: u64) -> GridMesh {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut mesh = GridMesh::bordered(width, height);

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let r: f64 = rng.random();
            mesh.set_blocked(Point::new(x, y), r < wall_pct);
        }
    }

    for _ in 0..reps {
        let prev = mesh.clone();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let p = Point::new(x, y);
                let walls = (-1..=1)
                    .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
                    .filter(|&(dx, dy)| (dx, dy) != (0, 0) && prev.is_blocked(p.shift(dx, dy)))
                    .count();
                mesh.set_blocked(p, walls >= WALL_CUTOFF);
            }
        }
    }
    mesh
}

/// All free cells, in row-major order.
pub fn free_cells(mesh: &GridMesh) -> Vec<Point> {
    let mut out = Vec::new();
    for y in 0..mesh.height() {
        for x in 0..mesh.width() {
            let p = Point::new(x, y);
            if !mesh.is_blocked(p) {
                out.push(p);
            }
        }
    }
    out
}

/// Pick a random free cell.
pub fn random_free(mesh: &GridMesh, rng: &mut impl Rng) -> Option<Point> {
    let free = free_cells(mesh);
    if free.is_empty() {
        return None;
    }
    Some(free[rng.random_range(0..free.len())])
}

/// Render the mesh with `path` drawn on it: `S` start, `G` goal, `*` path.
pub fn render(mesh: &GridMesh, path: &[NodeId]) -> String {
    let mut out = String::with_capacity(((mesh.width() + 1) * mesh.height()) as usize);
    for y in 0..mesh.height() {
        for x in 0..mesh.width() {
            let p = Point::new(x, y);
            let idx = mesh.index(p);
            let ch = match idx {
                Some(i) if path.last() == Some(&i) => 'S',
                Some(i) if path.first() == Some(&i) => 'G',
                Some(i) if path.contains(&i) => '*',
                _ if mesh.is_blocked(p) => '#',
                _ => '.',
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cave_is_deterministic_and_bordered() {
        let a = cave(30, 20, 0.45, 3, 7);
        let b = cave(30, 20, 0.45, 3, 7);
        assert_eq!(a, b);
        assert!(a.is_blocked(Point::new(0, 5)));
        assert!(a.is_blocked(Point::new(29, 19)));
    }

    #[test]
    fn render_marks_path() {
        let mesh = GridMesh::bordered(4, 3);
        let path = vec![
            mesh.index(Point::new(2, 1)).unwrap(),
            mesh.index(Point::new(1, 1)).unwrap(),
        ];
        assert_eq!(render(&mesh, &path), "####\n#SG#\n####\n");
    }
}
