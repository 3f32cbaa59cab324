//! Resolve many asynchronous requests on a random cave using a worker pool.
//!
//! Run: cargo run --bin crowd -- [workers] [tickets] [seed]

use std::sync::Arc;
use std::time::Instant;

use findpath_demos::{cave, random_free, render};
use findpath_engine::{Engine, EngineConfig, Mode, Relaxation, Ticket, TicketState};
use rand::SeedableRng;

fn arg<T: std::str::FromStr>(n: usize, default: T) -> T {
    std::env::args()
        .nth(n)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let workers: usize = arg(1, 4);
    let count: usize = arg(2, 64);
    let seed: u64 = arg(3, 42);

    let mesh = Arc::new(cave(80, 40, 0.42, 4, seed));
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let config = EngineConfig::new()
        .with_workers(workers)
        .with_relaxation(Relaxation::Reparent);
    let mut engine = match Engine::with_config(Arc::clone(&mesh), config) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let mut tickets = Vec::with_capacity(count);
    for _ in 0..count {
        let (Some(s), Some(g)) = (random_free(&mesh, &mut rng), random_free(&mesh, &mut rng))
        else {
            log::error!("cave has no free cells");
            std::process::exit(1);
        };
        let (Some(s), Some(g)) = (mesh.index(s), mesh.index(g)) else {
            continue;
        };
        let ticket = Ticket::new(s, g, Mode::Async);
        if let Err(e) = engine.add_ticket(&ticket) {
            log::warn!("{e}");
            continue;
        }
        tickets.push(ticket);
    }

    let began = Instant::now();
    let mut ticks = 0u64;
    while !engine.update() {
        ticks += 1;
        std::thread::yield_now();
    }
    engine.finish();

    let completed = tickets
        .iter()
        .filter(|t| t.state() == TicketState::Completed)
        .count();
    let steps: u64 = tickets.iter().map(|t| u64::from(t.steps())).sum();
    log::info!(
        "{completed}/{} completed, {steps} steps, {} workers, {ticks} ticks in {:?}",
        tickets.len(),
        workers,
        began.elapsed()
    );

    if let Some(longest) = tickets
        .iter()
        .filter(|t| t.state() == TicketState::Completed)
        .max_by_key(|t| t.found_path().len())
    {
        println!(
            "longest path: ticket {} with {} nodes",
            longest.id(),
            longest.found_path().len()
        );
        print!("{}", render(&mesh, &longest.found_path()));
    }
}
