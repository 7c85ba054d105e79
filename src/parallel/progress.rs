//! Result collection and progress reporting for a batch run

use console::style;
use crossbeam::channel::Receiver;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::debug;

use crate::error::{ResizeError, Result};
use crate::jobs::Job;
use crate::parallel::JobOutcome;

/// A collected job: its file name and position in collection order
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    pub file_name: String,
    pub index: usize,
    pub outcome: JobOutcome,
}

/// Receiver of per-job progress events. Called from worker threads.
pub trait ProgressSink: Sync {
    /// A worker picked up `job`
    fn job_started(&self, worker: usize, job: &Job);

    /// The collector received a finished job
    fn job_completed(&self, result: &JobResult);
}

/// Sink that reports nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn job_started(&self, _worker: usize, _job: &Job) {}

    fn job_completed(&self, _result: &JobResult) {}
}

/// Drains exactly one result per dispatched job
#[derive(Debug, Clone, Copy)]
pub struct ResultCollector {
    expected: usize,
}

impl ResultCollector {
    pub fn new(expected: usize) -> Self {
        Self { expected }
    }

    /// Receive `expected` results in arrival order, numbering them 0..N-1.
    ///
    /// Stops at the first failed job and returns its error.
    pub fn collect<S>(
        &self,
        results: &Receiver<Result<JobOutcome>>,
        sink: &S,
    ) -> Result<Vec<JobResult>>
    where
        S: ProgressSink + ?Sized,
    {
        let mut collected = Vec::with_capacity(self.expected);

        for index in 0..self.expected {
            let outcome = results.recv().map_err(|_| {
                ResizeError::parallel(format!(
                    "workers exited after reporting {} of {} jobs",
                    index, self.expected
                ))
            })??;

            let result = JobResult {
                file_name: outcome.file_name.clone(),
                index,
                outcome,
            };
            debug!("Collected {} [{}]", result.file_name, index);
            sink.job_completed(&result);
            collected.push(result);
        }

        Ok(collected)
    }
}

/// Console reporter printing one line per started and per collected job
pub struct ConsoleProgress {
    bar: ProgressBar,
    quiet: bool,
}

impl ConsoleProgress {
    /// Reporter for a batch of `total` jobs. `quiet` suppresses all lines.
    pub fn new(total: usize, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr())
        };

        let template = "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len}";
        if let Ok(bar_style) = ProgressStyle::default_bar().template(template) {
            bar.set_style(bar_style.progress_chars("#>-"));
        }

        Self { bar, quiet }
    }

    /// Stop drawing the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for ConsoleProgress {
    fn job_started(&self, worker: usize, job: &Job) {
        if self.quiet {
            return;
        }
        // suspend() also prints when the bar is hidden
        self.bar
            .suspend(|| println!("Resizing {} (worker {})", job.file_name(), worker));
    }

    fn job_completed(&self, result: &JobResult) {
        if !self.quiet {
            self.bar.suspend(|| {
                println!("{} {} [{}]", result.file_name, style("OK").green(), result.index)
            });
        }
        self.bar.inc(1);
    }
}
