//! Fixed-size worker pool
//!
//! Jobs are dispatched fire-and-forget onto a rayon thread pool sized to the
//! host's CPUs. Completion is tracked with a crossbeam [`WaitGroup`]: every
//! dispatched job holds a token until it has run, and
//! [`WorkerPool::stop_and_wait`] consumes the pool and blocks until all
//! tokens are dropped.

use crate::error::{QcpError, Result};
use crossbeam::sync::WaitGroup;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bounded pool of copy workers
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    pending: WaitGroup,
    threads: usize,
    dispatched: AtomicU64,
}

impl WorkerPool {
    /// Create a pool with `threads` workers (0 = number of CPUs)
    pub fn new(threads: usize) -> Result<Self> {
        let threads = if threads == 0 { num_cpus::get() } else { threads };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("qcp-worker-{}", i))
            .build()
            .map_err(|e| QcpError::config(format!("Failed to build worker pool: {}", e)))?;

        tracing::debug!("Worker pool started with {} threads", threads);

        Ok(Self {
            pool,
            pending: WaitGroup::new(),
            threads,
            dispatched: AtomicU64::new(0),
        })
    }

    /// Number of worker threads
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Number of jobs dispatched so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Queue a job without waiting for it to run
    pub fn dispatch<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let token = self.pending.clone();
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        self.pool.spawn(move || {
            task();
            drop(token);
        });
    }

    /// Stop accepting work and block until every dispatched job has finished
    pub fn stop_and_wait(self) {
        let Self {
            pool,
            pending,
            dispatched,
            ..
        } = self;

        pending.wait();
        tracing::debug!("Worker pool drained after {} jobs", dispatched.into_inner());
        drop(pool);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_all_dispatched_jobs_finish_before_wait_returns() {
        let pool = WorkerPool::new(4).unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..200 {
            let done = Arc::clone(&done);
            pool.dispatch(move || {
                std::thread::sleep(Duration::from_micros(50));
                done.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(pool.dispatched(), 200);
        pool.stop_and_wait();
        assert_eq!(done.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn test_concurrency_is_bounded_by_thread_count() {
        let pool = WorkerPool::new(2).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            pool.dispatch(move || {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(2));
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }

        pool.stop_and_wait();
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_zero_threads_means_cpu_count() {
        let pool = WorkerPool::new(0).unwrap();
        assert_eq!(pool.threads(), num_cpus::get());
        pool.stop_and_wait();
    }

    #[test]
    fn test_wait_on_empty_pool_returns() {
        WorkerPool::new(1).unwrap().stop_and_wait();
    }
}
