//! Decode/encode boundary between raw request bytes and the working buffer.
//!
//! Everything downstream operates on an 8-bit RGBA buffer; the original
//! container format is remembered only to pick the output encoding. Lossless
//! sources re-encode losslessly, everything else goes out as high-quality
//! JPEG to minimize generation loss across repeated profile application.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};

use super::AdjustError;

/// Output JPEG quality. The profile may be reapplied to many photos, so the
/// lossy path stays near-transparent.
pub const JPEG_QUALITY: u8 = 95;

/// Container format of the source bytes, as far as output encoding cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
    Jpeg,
    WebP,
    Other,
}

impl SourceFormat {
    fn from_image_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => SourceFormat::Png,
            ImageFormat::Jpeg => SourceFormat::Jpeg,
            ImageFormat::WebP => SourceFormat::WebP,
            _ => SourceFormat::Other,
        }
    }

    /// Whether the source container is lossless and should stay lossless.
    pub fn is_lossless(self) -> bool {
        matches!(self, SourceFormat::Png)
    }
}

/// A decoded image: RGBA working pixels plus the source container format.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub format: SourceFormat,
    pub image: RgbaImage,
}

impl DecodedImage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AdjustError> {
        if bytes.is_empty() {
            return Err(AdjustError::EmptyImage);
        }

        let format = image::guess_format(bytes)
            .map(SourceFormat::from_image_format)
            .unwrap_or(SourceFormat::Other);

        let decoded =
            image::load_from_memory(bytes).map_err(|e| AdjustError::Decode(e.to_string()))?;
        let image = decoded.to_rgba8();

        if image.width() == 0 || image.height() == 0 {
            return Err(AdjustError::EmptyImage);
        }

        Ok(Self { format, image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encode respecting the source container: PNG stays PNG, everything
    /// else becomes JPEG at [`JPEG_QUALITY`].
    pub fn encode(&self) -> Result<Vec<u8>, AdjustError> {
        if self.format.is_lossless() {
            encode_png(&self.image)
        } else {
            encode_jpeg(&self.image)
        }
    }
}

/// Encode an RGBA buffer as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, AdjustError> {
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| AdjustError::Encode(e.to_string()))?;
    Ok(out)
}

/// Encode an RGBA buffer as high-quality JPEG (alpha dropped).
pub fn encode_jpeg(image: &RgbaImage) -> Result<Vec<u8>, AdjustError> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .map_err(|e| AdjustError::Encode(e.to_string()))?;
    Ok(out)
}

/// Bound a training image to `max_dimension` on either axis before it is
/// shipped to the analyzer. Small images pass through re-encoded; large ones
/// are downscaled with Lanczos3 preserving aspect ratio.
pub fn optimize_for_analysis(bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>, AdjustError> {
    let decoded = DecodedImage::from_bytes(bytes)?;
    let (w, h) = (decoded.width(), decoded.height());

    if w <= max_dimension && h <= max_dimension {
        return encode_jpeg(&decoded.image);
    }

    let resized = DynamicImage::ImageRgba8(decoded.image)
        .resize(max_dimension, max_dimension, FilterType::Lanczos3)
        .to_rgba8();
    encode_jpeg(&resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    pub(crate) fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba(rgba));
        encode_png(&img).unwrap()
    }

    #[test]
    fn decode_rejects_empty_input() {
        assert!(matches!(
            DecodedImage::from_bytes(&[]),
            Err(AdjustError::EmptyImage)
        ));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            DecodedImage::from_bytes(b"not an image at all"),
            Err(AdjustError::Decode(_))
        ));
    }

    #[test]
    fn png_source_stays_png() {
        let bytes = solid_png(8, 8, [120, 130, 140, 255]);
        let decoded = DecodedImage::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.format, SourceFormat::Png);

        let out = decoded.encode().unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn lossy_source_encodes_jpeg() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        let jpeg = encode_jpeg(&img).unwrap();
        let decoded = DecodedImage::from_bytes(&jpeg).unwrap();
        assert_eq!(decoded.format, SourceFormat::Jpeg);

        let out = decoded.encode().unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn optimize_downscales_oversized_input() {
        let bytes = solid_png(64, 32, [200, 100, 50, 255]);
        let out = optimize_for_analysis(&bytes, 16).unwrap();
        let bounded = DecodedImage::from_bytes(&out).unwrap();
        assert!(bounded.width() <= 16 && bounded.height() <= 16);
        // Aspect ratio preserved: 2:1 stays 2:1.
        assert_eq!(bounded.width(), 16);
        assert_eq!(bounded.height(), 8);
    }

    #[test]
    fn optimize_leaves_small_input_dimensions_alone() {
        let bytes = solid_png(10, 10, [5, 5, 5, 255]);
        let out = optimize_for_analysis(&bytes, 2560).unwrap();
        let same = DecodedImage::from_bytes(&out).unwrap();
        assert_eq!((same.width(), same.height()), (10, 10));
    }
}
