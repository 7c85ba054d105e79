//! boxresize - batch image downscaler
//!
//! Shrinks every JPEG, PNG and GIF in a directory by a fractional factor,
//! writing `name_resized.ext` next to each original. Files are spread over a
//! fixed pool of worker threads; each worker downsamples with a 2x2 box filter
//! that clamps at the image edges.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use boxresize::{enumerate_jobs, Config, NoProgress, ProcessingEngine, ScaleFactor, WorkerPool};
//!
//! let config = Config::default();
//! let jobs = enumerate_jobs("photos", &config.processing)?;
//!
//! let engine = ProcessingEngine::new(ScaleFactor::new(0.5)?);
//! let pool = WorkerPool::new(config.processing.workers)?;
//! let results = pool.run(jobs, &engine, &NoProgress)?;
//!
//! for result in &results {
//!     println!("{} OK [{}]", result.file_name, result.index);
//! }
//! # Ok::<(), boxresize::ResizeError>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod error;
pub mod jobs;
pub mod parallel;
pub mod processing;

// Re-export commonly used types
pub use config::{Config, LoggingConfig, ProcessingConfig, ScaleFactor};
pub use error::{ResizeError, Result};
pub use jobs::{enumerate_jobs, Job};
pub use parallel::{
    ConsoleProgress, JobHandler, JobOutcome, JobResult, NoProgress, ProgressSink, WorkerPool,
};
pub use processing::{ImageFormat, ProcessingEngine};

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging from `RUST_LOG`.
///
/// Logs go to stderr. Calling this more than once is harmless.
pub fn init() {
    install_subscriber(EnvFilter::from_default_env(), false);
}

/// Initialize logging with the level and format from `config`
pub fn init_with_config(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.level).map_err(|e| {
        ResizeError::config(format!("Invalid log level '{}': {}", config.level, e))
    })?;
    install_subscriber(filter, config.json_format);
    Ok(())
}

fn install_subscriber(filter: EnvFilter, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish()).is_ok()
    } else {
        tracing::subscriber::set_global_default(builder.finish()).is_ok()
    };

    if installed {
        info!("boxresize v{} initialized", VERSION);
    }
}
