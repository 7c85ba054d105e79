//! Core image processing functionality

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use image::RgbaImage;
use tracing::{debug, warn};

use crate::config::ScaleFactor;
use crate::error::{ErrorContext, Result};
use crate::jobs::Job;
use crate::parallel::{JobHandler, JobOutcome};

pub mod formats;
pub mod resize;
pub mod sample;

pub use formats::*;
pub use resize::*;
pub use sample::*;

/// Per-file pipeline run by every pool worker: decode, resize, encode, write
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessingEngine {
    factor: ScaleFactor,
}

impl ProcessingEngine {
    /// Create a new processing engine
    pub fn new(factor: ScaleFactor) -> Self {
        Self { factor }
    }

    /// Resize `input` into `output`, re-encoding in the format sniffed from `input`.
    ///
    /// A source that scales down to zero width or height has nothing to encode;
    /// `output` is created empty and the job still succeeds.
    ///
    /// Returns the source dimensions, output dimensions and the format used.
    pub fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<((u32, u32), (u32, u32), ImageFormat)> {
        let input = input.as_ref();
        let output = output.as_ref();
        let start = Instant::now();

        let (source, format) = load_image(input)?;
        let resized = resize_image(&source, self.factor);
        if resized.width() == 0 || resized.height() == 0 {
            warn!(
                "{:?} scales to {}x{}, writing an empty {:?}",
                input,
                resized.width(),
                resized.height(),
                output
            );
            File::create(output).with_file_context(output)?;
        } else {
            save_image(&resized, format, output)?;
        }

        debug!(
            "Wrote {:?} as {} in {:.2}s",
            output,
            format,
            start.elapsed().as_secs_f64()
        );

        Ok((source.dimensions(), resized.dimensions(), format))
    }
}

impl JobHandler for ProcessingEngine {
    fn process(&self, worker: usize, job: &Job) -> Result<JobOutcome> {
        let (source_dimensions, output_dimensions, format) =
            self.process_file(job.source(), job.output_path())?;

        Ok(JobOutcome {
            source_dimensions,
            output_dimensions,
            format: Some(format),
            ..JobOutcome::for_job(worker, job)
        })
    }
}

/// Open and decode an image file
pub fn load_image(path: &Path) -> Result<(SourceImage, ImageFormat)> {
    debug!("Loading image: {:?}", path);

    let file = File::open(path).with_file_context(path)?;
    let (image, format) = decode(BufReader::new(file)).with_file_context(path)?;

    debug!(
        "Loaded {:?}: {}x{} {}",
        path,
        image.width(),
        image.height(),
        format
    );
    Ok((image, format))
}

/// Create `path` and encode `image` into it
pub fn save_image(image: &RgbaImage, format: ImageFormat, path: &Path) -> Result<()> {
    let file = File::create(path).with_file_context(path)?;
    let mut writer = BufWriter::new(file);
    encode(image, format, &mut writer).with_file_context(path)?;
    writer.flush().with_file_context(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResizeError;
    use image::Rgba;
    use tempfile::TempDir;

    fn write_png(path: &Path, image: &RgbaImage) {
        let mut bytes = Vec::new();
        encode(image, ImageFormat::Png, &mut bytes).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_process_file_png() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.png");
        let output = dir.path().join("a_resized.png");
        write_png(&input, &RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));

        let engine = ProcessingEngine::default();
        let (src, out, format) = engine.process_file(&input, &output).unwrap();
        assert_eq!((src, out, format), ((4, 4), (2, 2), ImageFormat::Png));

        let resized = image::open(&output).unwrap().to_rgba8();
        assert_eq!(resized.dimensions(), (2, 2));
        assert!(resized.pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn test_format_follows_content_not_extension() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("fake.jpg");
        let output = dir.path().join("fake_resized.jpg");
        write_png(&input, &RgbaImage::from_pixel(6, 6, Rgba([0, 255, 0, 255])));

        let (_, _, format) = ProcessingEngine::default()
            .process_file(&input, &output)
            .unwrap();
        assert_eq!(format, ImageFormat::Png);

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
    }

    #[test]
    fn test_zero_area_output_writes_empty_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("thin.png");
        let output = dir.path().join("thin_resized.png");
        write_png(&input, &RgbaImage::from_pixel(1, 9, Rgba([0, 0, 255, 255])));

        let (src, out, format) = ProcessingEngine::default()
            .process_file(&input, &output)
            .unwrap();
        assert_eq!((src, out, format), ((1, 9), (0, 4), ImageFormat::Png));
        assert_eq!(std::fs::metadata(&output).unwrap().len(), 0);
    }

    #[test]
    fn test_job_handler_reports_outcome() {
        let dir = TempDir::new().unwrap();
        write_png(&dir.path().join("b.png"), &RgbaImage::new(10, 4));
        let job = Job::new(dir.path(), "b.png", "_resized").unwrap();

        let engine = ProcessingEngine::new(ScaleFactor::new(0.5).unwrap());
        let outcome = engine.process(3, &job).unwrap();

        assert_eq!(outcome.file_name, "b.png");
        assert_eq!(outcome.worker, 3);
        assert_eq!(outcome.source_dimensions, (10, 4));
        assert_eq!(outcome.output_dimensions, (5, 2));
        assert_eq!(outcome.format, Some(ImageFormat::Png));
        assert!(outcome.output_path.exists());
    }

    #[test]
    fn test_missing_and_corrupt_inputs() {
        let dir = TempDir::new().unwrap();
        let engine = ProcessingEngine::default();

        let missing = dir.path().join("missing.png");
        let err = engine
            .process_file(&missing, dir.path().join("out.png"))
            .unwrap_err();
        assert_eq!(err.file_path(), Some(missing.as_path()));

        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"\x89PNG\r\n\x1a\n garbage").unwrap();
        let err = engine
            .process_file(&corrupt, dir.path().join("corrupt_resized.png"))
            .unwrap_err();
        assert!(matches!(err, ResizeError::JobFailed { .. }));
    }
}
