//! Box-filter downscaling

use image::RgbaImage;
use tracing::debug;

use crate::config::ScaleFactor;
use crate::processing::sample::{sample_2x2, SourceImage};

/// Output size for a source of `width` x `height` scaled by `factor`, truncated.
pub fn output_dimensions(width: u32, height: u32, factor: ScaleFactor) -> (u32, u32) {
    (scale(width, factor), scale(height, factor))
}

fn scale(value: u32, factor: ScaleFactor) -> u32 {
    (f64::from(value) * factor.get()) as u32
}

/// Downscale `source` by `factor` with the 2x2 box filter.
///
/// Walks every source pixel, forward-maps it to `(floor(j * f), floor(i * f))`
/// and stores the 2x2 average taken at that source position. Writes that land
/// outside the output canvas are dropped; when several source pixels map to
/// the same output pixel the last one wins.
pub fn resize_image(source: &SourceImage, factor: ScaleFactor) -> RgbaImage {
    let (width, height) = source.dimensions();
    let (out_width, out_height) = output_dimensions(width, height, factor);

    debug!(
        "Resizing {}x{} -> {}x{} (factor {})",
        width, height, out_width, out_height, factor
    );

    let mut out = RgbaImage::new(out_width, out_height);
    for i in 0..height {
        let y = scale(i, factor);
        if y >= out_height {
            continue;
        }
        for j in 0..width {
            let x = scale(j, factor);
            if x >= out_width {
                continue;
            }
            out.put_pixel(x, y, sample_2x2(source, j, i));
        }
    }

    out
}
