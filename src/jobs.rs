//! Discovery of input files and the per-file resize jobs built from them

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::{ResizeError, Result};

/// One input image to resize and the output path it must produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    source: PathBuf,
    file_name: String,
    output: PathBuf,
}

impl Job {
    /// Build a job for `file_name` inside `dir`.
    ///
    /// Returns `None` when the name has no stem or no extension.
    pub fn new(dir: &Path, file_name: &str, marker: &str) -> Option<Self> {
        let (stem, extension) = split_name(file_name)?;
        let output_name = format!("{}{}.{}", stem, marker, extension);

        Some(Self {
            source: dir.join(file_name),
            file_name: file_name.to_string(),
            output: dir.join(output_name),
        })
    }

    /// Full path of the input image
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Input file name as listed in the directory
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Path the resized image is written to
    pub fn output_path(&self) -> &Path {
        &self.output
    }
}

fn split_name(file_name: &str) -> Option<(&str, &str)> {
    let path = Path::new(file_name);
    let stem = path.file_stem()?.to_str()?;
    let extension = path.extension()?.to_str()?;
    Some((stem, extension))
}

/// Whether `file_name` should be resized under `config`.
///
/// The lowercase extension must be recognized and the base name must not
/// carry the output marker.
pub fn is_eligible(file_name: &str, config: &ProcessingConfig) -> bool {
    match split_name(file_name) {
        Some((stem, extension)) => {
            config.recognizes(&extension.to_lowercase()) && !stem.contains(&config.marker)
        }
        None => false,
    }
}

/// List `dir` (one level, sorted by file name) and build a job per eligible file
pub fn enumerate_jobs<P: AsRef<Path>>(dir: P, config: &ProcessingConfig) -> Result<Vec<Job>> {
    let dir = dir.as_ref();

    let metadata = std::fs::metadata(dir).map_err(|e| listing_error(dir, e.kind(), &e))?;
    if !metadata.is_dir() {
        return Err(listing_error(
            dir,
            io::ErrorKind::InvalidInput,
            &"not a directory",
        ));
    }

    let mut jobs = Vec::new();
    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in entries {
        let entry = entry.map_err(|e| {
            let kind = e.io_error().map_or(io::ErrorKind::Other, io::Error::kind);
            listing_error(dir, kind, &e)
        })?;

        if !entry.file_type().is_file() {
            debug!("Skipping non-file entry: {:?}", entry.path());
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            debug!("Skipping non UTF-8 file name: {:?}", entry.file_name());
            continue;
        };

        if !is_eligible(file_name, config) {
            debug!("Skipping ineligible file: {}", file_name);
            continue;
        }

        if let Some(job) = Job::new(dir, file_name, &config.marker) {
            jobs.push(job);
        }
    }

    info!("Found {} images to resize in {}", jobs.len(), dir.display());
    Ok(jobs)
}

fn listing_error(dir: &Path, kind: io::ErrorKind, cause: &dyn fmt::Display) -> ResizeError {
    let message = format!("cannot list {}: {}", dir.display(), cause);
    ResizeError::IoError(io::Error::new(kind, message))
}
