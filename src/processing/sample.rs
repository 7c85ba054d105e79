//! 2x2 box sampling with edge clamping

use image::{ImageBuffer, Rgba};

/// Decoded source image widened to 16 bits per channel
pub type SourceImage = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Clamp `x` and `y` to `[0, width-1]` and `[0, height-1]` respectively.
///
/// Each axis is clamped independently. `width` and `height` must be non-zero.
pub fn clamp(x: u32, y: u32, width: u32, height: u32) -> (u32, u32) {
    debug_assert!(width > 0 && height > 0, "clamp on an empty image");
    (x.min(width - 1), y.min(height - 1))
}

/// Average four straight-alpha 16-bit-scale colors into one 8-bit color.
///
/// Colors are premultiplied by their alpha before summing, so fully
/// transparent samples contribute no color. Each premultiplied sum is divided
/// by 1024 (four samples, then 16 to 8 bits), truncating, and the result is
/// converted back to straight alpha. Opaque inputs come out exactly as
/// `sum >> 10`.
pub fn average_2x2(c00: Rgba<u16>, c01: Rgba<u16>, c10: Rgba<u16>, c11: Rgba<u16>) -> Rgba<u8> {
    let samples = [c00, c01, c10, c11];
    // 4 * u16::MAX >> 10 == 255
    let alpha: u32 = samples.iter().map(|c| u32::from(c[3])).sum::<u32>() >> 10;

    let mut out = [0u8; 4];
    for (channel, value) in out.iter_mut().take(3).enumerate() {
        let sum: u32 = samples
            .iter()
            .map(|c| premultiply(c[channel], c[3]))
            .sum();
        *value = unpremultiply(sum >> 10, alpha);
    }
    out[3] = alpha as u8;
    Rgba(out)
}

fn premultiply(value: u16, alpha: u16) -> u32 {
    u32::from(value) * u32::from(alpha) / 0xffff
}

/// `value` and `alpha` are 8-bit premultiplied; `value <= alpha` always holds.
fn unpremultiply(value: u32, alpha: u32) -> u8 {
    if alpha == 0 {
        return 0;
    }
    ((value * 0xffff / alpha) >> 8) as u8
}

/// Sample the 2x2 neighbourhood whose top-left corner is `(x, y)`.
///
/// Neighbours past the right or bottom edge reuse the edge pixels.
pub fn sample_2x2(image: &SourceImage, x: u32, y: u32) -> Rgba<u8> {
    let (width, height) = image.dimensions();
    let at = |px: u32, py: u32| {
        let (cx, cy) = clamp(px, py, width, height);
        *image.get_pixel(cx, cy)
    };

    average_2x2(
        at(x, y),
        at(x.saturating_add(1), y),
        at(x, y.saturating_add(1)),
        at(x.saturating_add(1), y.saturating_add(1)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(v: u8) -> u16 {
        u16::from(v) * 257
    }

    fn solid(r: u8, g: u8, b: u8, a: u8) -> Rgba<u16> {
        Rgba([wide(r), wide(g), wide(b), wide(a)])
    }

    #[test]
    fn test_clamp_inside_is_identity() {
        assert_eq!(clamp(2, 3, 10, 10), (2, 3));
        assert_eq!(clamp(0, 0, 1, 1), (0, 0));
    }

    #[test]
    fn test_clamp_axes_independently() {
        assert_eq!(clamp(10, 3, 10, 10), (9, 3));
        assert_eq!(clamp(3, 12, 10, 5), (3, 4));
        assert_eq!(clamp(u32::MAX, u32::MAX, 4, 7), (3, 6));
    }

    #[test]
    fn test_average_of_identical_colors() {
        let red = solid(255, 0, 0, 255);
        assert_eq!(average_2x2(red, red, red, red), Rgba([255, 0, 0, 255]));

        for v in [0u8, 1, 17, 128, 200, 254, 255] {
            let c = solid(v, v, v, 255);
            assert_eq!(average_2x2(c, c, c, c), Rgba([v, v, v, 255]));
        }
    }

    #[test]
    fn test_average_truncates() {
        let black = solid(0, 0, 0, 255);
        let white = solid(255, 255, 255, 255);
        // (3 * 65535) / 1024 = 191.99...
        assert_eq!(
            average_2x2(white, white, white, black),
            Rgba([191, 191, 191, 255])
        );
        // 65535 / 1024 = 63.99...
        assert_eq!(
            average_2x2(white, black, black, black),
            Rgba([63, 63, 63, 255])
        );
    }

    #[test]
    fn test_channels_are_independent() {
        let c = solid(10, 20, 30, 255);
        assert_eq!(average_2x2(c, c, c, c), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_transparent_samples_carry_no_color() {
        let red = solid(255, 0, 0, 255);
        let clear_white = solid(255, 255, 255, 0);
        assert_eq!(
            average_2x2(red, clear_white, clear_white, clear_white),
            Rgba([255, 0, 0, 63])
        );

        let clear_blue = solid(0, 0, 255, 0);
        assert_eq!(
            average_2x2(red, red, clear_blue, clear_blue),
            Rgba([255, 0, 0, 127])
        );

        let clear = solid(0, 0, 0, 0);
        assert_eq!(average_2x2(clear, clear, clear, clear), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_semi_transparent_average() {
        let c = solid(200, 100, 50, 128);
        // Premultiplied at 8-bit precision, then converted back
        assert_eq!(average_2x2(c, c, c, c), Rgba([199, 99, 49, 128]));

        let white = solid(255, 255, 255, 255);
        let clear = solid(0, 0, 0, 0);
        assert_eq!(
            average_2x2(white, white, white, clear),
            Rgba([255, 255, 255, 191])
        );
    }

    #[test]
    fn test_sample_drops_color_of_transparent_neighbours() {
        let image = SourceImage::from_fn(2, 2, |x, y| {
            if (x, y) == (0, 0) {
                solid(255, 0, 0, 255)
            } else {
                solid(255, 255, 255, 0)
            }
        });
        assert_eq!(sample_2x2(&image, 0, 0), Rgba([255, 0, 0, 63]));
    }

    fn gray_sum(values: [u32; 4]) -> u8 {
        (values.iter().sum::<u32>() * 257 / 1024) as u8
    }

    #[test]
    fn test_sample_corners_stay_in_bounds() {
        let image = SourceImage::from_fn(3, 2, |x, y| {
            let v = (x + 3 * y) as u8 * 40;
            solid(v, v, v, 255)
        });

        // (0,0): pixels (0,0) (1,0) (0,1) (1,1) -> 0, 40, 120, 160
        assert_eq!(sample_2x2(&image, 0, 0)[0], gray_sum([0, 40, 120, 160]));

        // Bottom-right corner samples itself four times
        assert_eq!(sample_2x2(&image, 2, 1), Rgba([200, 200, 200, 255]));

        // Right edge duplicates the last column
        assert_eq!(sample_2x2(&image, 2, 0)[0], gray_sum([80, 80, 200, 200]));

        // Bottom-left duplicates the last row
        assert_eq!(sample_2x2(&image, 0, 1)[0], gray_sum([120, 160, 120, 160]));
    }

    #[test]
    fn test_single_pixel_image() {
        let image = SourceImage::from_pixel(1, 1, solid(9, 8, 7, 255));
        assert_eq!(sample_2x2(&image, 0, 0), Rgba([9, 8, 7, 255]));
    }
}
