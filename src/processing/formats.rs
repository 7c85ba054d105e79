//! Image format detection and codec glue

use std::fmt;
use std::io::{BufRead, Seek, Write};

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, RgbaImage};

use crate::error::{ResizeError, Result};
use crate::processing::sample::SourceImage;

/// Quality used for JPEG output, the usual codec default
pub const JPEG_QUALITY: u8 = 75;

/// Formats the resizer can decode and re-encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
        };
        f.write_str(name)
    }
}

impl TryFrom<image::ImageFormat> for ImageFormat {
    type Error = ResizeError;

    fn try_from(format: image::ImageFormat) -> Result<Self> {
        match format {
            image::ImageFormat::Jpeg => Ok(Self::Jpeg),
            image::ImageFormat::Png => Ok(Self::Png),
            image::ImageFormat::Gif => Ok(Self::Gif),
            other => Err(ResizeError::unsupported_format(format!("{:?}", other), None)),
        }
    }
}

impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Gif => image::ImageFormat::Gif,
        }
    }
}

/// Detect image format from file header (magic bytes)
pub fn detect_format_from_header(data: &[u8]) -> Result<ImageFormat> {
    let format = image::guess_format(data)
        .map_err(|_| ResizeError::unsupported_format("Unknown (magic bytes)", None))?;
    ImageFormat::try_from(format)
}

/// Decode an image, sniffing its format from content rather than from any name.
///
/// Returns the pixels widened to 16 bits per channel together with the
/// detected format.
pub fn decode<R: BufRead + Seek>(mut reader: R) -> Result<(SourceImage, ImageFormat)> {
    let format = detect_format_from_header(reader.fill_buf()?)?;
    let image = image::io::Reader::with_format(reader, format.into()).decode()?;
    Ok((image.to_rgba16(), format))
}

/// Encode `image` as `format` with default codec settings
pub fn encode<W: Write>(image: &RgbaImage, format: ImageFormat, writer: W) -> Result<()> {
    let (width, height) = image.dimensions();
    match format {
        ImageFormat::Jpeg => {
            // JPEG carries no alpha channel
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(writer, JPEG_QUALITY).write_image(
                rgb.as_raw(),
                width,
                height,
                ColorType::Rgb8,
            )?;
        }
        ImageFormat::Png => {
            PngEncoder::new(writer).write_image(image.as_raw(), width, height, ColorType::Rgba8)?;
        }
        ImageFormat::Gif => {
            let mut encoder = GifEncoder::new(writer);
            encoder.encode(image.as_raw(), width, height, ColorType::Rgba8)?;
        }
    }
    Ok(())
}
