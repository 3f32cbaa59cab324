//! Resolve one request on an 8×8 room with a solid border.
//!
//! Run: cargo run --bin gridpath

use std::sync::Arc;

use findpath_core::{GridMesh, Point};
use findpath_demos::render;
use findpath_engine::{Engine, Mode, Ticket};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mesh = Arc::new(GridMesh::bordered(8, 8));
    let (Some(start), Some(goal)) = (mesh.index(Point::new(1, 1)), mesh.index(Point::new(6, 6)))
    else {
        log::error!("start or goal outside the grid");
        std::process::exit(1);
    };

    // No workers: the async request is stepped on this thread.
    let mut engine = match Engine::new(Arc::clone(&mesh), 0) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    let ticket = Ticket::new(start, goal, Mode::Async);
    if let Err(e) = engine.add_ticket(&ticket) {
        log::error!("{e}");
        std::process::exit(1);
    }

    let mut ticks = 0;
    while !engine.update() {
        ticks += 1;
    }
    log::info!(
        "ticket {} {} after {} steps ({} ticks)",
        ticket.id(),
        ticket.state(),
        ticket.steps(),
        ticks + 1
    );

    let path = ticket.found_path();
    for &i in &path {
        let p = mesh.point(i);
        println!("result {i} {}x{}", p.x, p.y);
    }
    print!("{}", render(&mesh, &path));
}
