//! Fixed-size worker pool fed by an unbounded job queue.

use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

pub(crate) struct WorkerPool {
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `size` workers. If any thread fails to start, the ones already
    /// running are joined before the error is returned.
    pub(crate) fn new(size: usize) -> io::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        let mut pool = Self {
            jobs: Some(tx),
            workers: Vec::with_capacity(size),
        };
        for i in 0..size {
            let rx = rx.clone();
            let handle = thread::Builder::new()
                .name(format!("findpath-worker-{i}"))
                .spawn(move || work(rx))?;
            pool.workers.push(handle);
        }
        log::debug!("worker pool started with {size} threads");
        Ok(pool)
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job. Hands the job back if no worker is left to run it.
    pub(crate) fn submit(&self, job: Job) -> Result<(), Job> {
        match &self.jobs {
            Some(tx) => tx.send(job).map_err(|e| e.0),
            None => Err(job),
        }
    }

    /// Close the queue and join every worker. Jobs already queued still run.
    pub(crate) fn shutdown(mut self) {
        self.join_all();
    }

    fn join_all(&mut self) {
        drop(self.jobs.take());
        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                log::warn!("{name} exited with a panic");
            }
        }
    }
}

// Dropping a pool that was not shut down explicitly (e.g. when `new` bails
// out halfway) still joins its threads.
impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join_all();
    }
}

fn work(rx: Receiver<Job>) {
    while let Ok(job) = rx.recv() {
        job();
    }
    log::trace!("{} exiting", thread::current().name().unwrap_or("worker"));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn runs_every_queued_job_before_shutdown_returns() {
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.size(), 3);
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..50 {
            let count = Arc::clone(&count);
            let job: Job = Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
            assert!(pool.submit(job).is_ok());
        }
        pool.shutdown();
        assert_eq!(count.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn empty_pool_rejects_jobs() {
        let mut pool = WorkerPool::new(0).unwrap();
        pool.join_all();
        let job: Job = Box::new(|| {});
        assert!(pool.submit(job).is_err());
    }
}
