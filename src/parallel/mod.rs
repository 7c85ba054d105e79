//! Fixed-size worker pool that fans resize jobs out to threads and fans
//! their outcomes back in.
//!
//! The coordinator preloads every job into a bounded channel sized to the
//! whole batch, closes it, and then drains exactly one result per job while
//! the workers run. The first failed job stops the batch: workers finish the
//! job they hold but pick up nothing new, and the error is returned.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::config::DEFAULT_WORKERS;
use crate::error::{ResizeError, Result};
use crate::jobs::Job;
use crate::processing::ImageFormat;

pub mod progress;

pub use progress::*;

/// Work executed by a pool worker for a single job
pub trait JobHandler: Sync {
    /// Process `job` on worker `worker` and describe what was produced
    fn process(&self, worker: usize, job: &Job) -> Result<JobOutcome>;
}

impl<F> JobHandler for F
where
    F: Fn(usize, &Job) -> Result<JobOutcome> + Sync,
{
    fn process(&self, worker: usize, job: &Job) -> Result<JobOutcome> {
        self(worker, job)
    }
}

/// Successful completion of one job, as reported by the worker
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub file_name: String,
    pub output_path: PathBuf,
    pub worker: usize,
    pub source_dimensions: (u32, u32),
    pub output_dimensions: (u32, u32),
    pub format: Option<ImageFormat>,
}

impl JobOutcome {
    /// Outcome carrying only the identity of the job
    pub fn for_job(worker: usize, job: &Job) -> Self {
        Self {
            file_name: job.file_name().to_string(),
            output_path: job.output_path().to_path_buf(),
            worker,
            source_dimensions: (0, 0),
            output_dimensions: (0, 0),
            format: None,
        }
    }
}

/// Pool of a fixed number of worker threads
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

impl WorkerPool {
    /// Create a pool with `workers` threads
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(ResizeError::config("Worker count must be greater than 0"));
        }
        Ok(Self { workers })
    }

    /// Number of worker threads spawned per run
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every job to completion and return the results in collection order.
    ///
    /// Blocks until all jobs have reported. Each job is handled by exactly one
    /// worker.
    pub fn run<H, S>(&self, jobs: Vec<Job>, handler: &H, sink: &S) -> Result<Vec<JobResult>>
    where
        H: JobHandler + ?Sized,
        S: ProgressSink + ?Sized,
    {
        let total = jobs.len();
        info!("Dispatching {} jobs to {} workers", total, self.workers);

        // Both queues hold the whole batch so neither side ever waits on capacity
        let capacity = total.max(1);
        let (job_tx, job_rx) = channel::bounded::<Job>(capacity);
        let (result_tx, result_rx) = channel::bounded::<Result<JobOutcome>>(capacity);

        for job in jobs {
            job_tx
                .send(job)
                .map_err(|_| ResizeError::parallel("job queue closed while feeding"))?;
        }
        drop(job_tx);

        let abort = AtomicBool::new(false);

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.workers);
            for worker in 0..self.workers {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                let abort = &abort;
                let handle = thread::Builder::new()
                    .name(format!("resize-worker-{}", worker))
                    .spawn_scoped(scope, move || {
                        worker_loop(worker, &jobs, &results, abort, handler, sink)
                    })
                    .map_err(|e| {
                        ResizeError::parallel(format!("failed to spawn worker: {}", e))
                    });

                match handle {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        abort.store(true, Ordering::SeqCst);
                        drop(result_tx);
                        let _ = join_workers(handles);
                        return Err(e);
                    }
                }
            }
            // Only workers hold senders now, so a dead pool disconnects the channel
            drop(result_tx);

            let collected = ResultCollector::new(total).collect(&result_rx, sink);
            if collected.is_err() {
                abort.store(true, Ordering::SeqCst);
            }

            let joined = join_workers(handles);
            let results = collected?;
            joined?;
            Ok(results)
        })
    }
}

fn worker_loop<H, S>(
    worker: usize,
    jobs: &Receiver<Job>,
    results: &Sender<Result<JobOutcome>>,
    abort: &AtomicBool,
    handler: &H,
    sink: &S,
) where
    H: JobHandler + ?Sized,
    S: ProgressSink + ?Sized,
{
    debug!("Worker {} started", worker);

    for job in jobs.iter() {
        if abort.load(Ordering::SeqCst) {
            debug!("Worker {} stopping, batch aborted", worker);
            break;
        }

        sink.job_started(worker, &job);
        let outcome = handler.process(worker, &job);
        if let Err(e) = &outcome {
            warn!("Worker {} failed on {}: {}", worker, job.file_name(), e);
            abort.store(true, Ordering::SeqCst);
        }

        if results.send(outcome).is_err() {
            // Collector already gave up
            break;
        }
    }

    debug!("Worker {} finished", worker);
}

fn join_workers(handles: Vec<thread::ScopedJoinHandle<'_, ()>>) -> Result<()> {
    let mut panicked = 0usize;
    for handle in handles {
        if handle.join().is_err() {
            panicked += 1;
        }
    }

    if panicked > 0 {
        return Err(ResizeError::parallel(format!(
            "{} worker thread(s) panicked",
            panicked
        )));
    }
    Ok(())
}
