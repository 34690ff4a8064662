//! Image statistics used for scene classification and response validation.
//!
//! Brightness and dynamic range are measured at full resolution in a single
//! pass; saturation and the tonal histogram are measured on a downsampled
//! copy bounded to 200×200 so the cost stays flat regardless of input size.

use image::imageops;
use image::RgbaImage;
use rayon::prelude::*;

use crate::pipeline::adjust::DecodedImage;

use super::AnalysisError;

/// Fixed flag thresholds (8-bit brightness, HSL saturation).
pub const DARK_BRIGHTNESS: f32 = 80.0;
pub const BRIGHT_BRIGHTNESS: f32 = 180.0;
pub const LOW_SATURATION: f32 = 0.2;
pub const HIGH_SATURATION: f32 = 0.6;

/// Saturation/histogram sampling resolution cap (per axis).
const STATS_MAX_DIMENSION: u32 = 200;

/// Three-bucket tonal histogram as fractions summing to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneHistogram {
    /// Brightness ≤ 85
    pub shadows: f32,
    /// Brightness 86–170
    pub midtones: f32,
    /// Brightness ≥ 171
    pub highlights: f32,
}

/// Derived, ephemeral statistics — recomputed for each image, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStatistics {
    /// Mean of per-channel means, 0–255.
    pub avg_brightness: f32,
    /// Mean HSL saturation, 0–1.
    pub avg_saturation: f32,
    pub is_dark: bool,
    pub is_bright: bool,
    pub is_low_sat: bool,
    pub is_high_sat: bool,
    pub histogram: ToneHistogram,
    /// 0–100 score derived from mean RGB channel standard deviation.
    pub dynamic_range: f32,
}

/// Compute [`ImageStatistics`] for a decoded image.
///
/// The only failure mode is empty/zero-dimension input.
pub fn analyze_image_stats(image: &DecodedImage) -> Result<ImageStatistics, AnalysisError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(AnalysisError::EmptyImage);
    }

    let (avg_brightness, dynamic_range) = brightness_and_range(&image.image);
    let thumb = bounded_thumbnail(&image.image);
    let (avg_saturation, histogram) = saturation_and_histogram(&thumb);

    Ok(ImageStatistics {
        avg_brightness,
        avg_saturation,
        is_dark: avg_brightness < DARK_BRIGHTNESS,
        is_bright: avg_brightness > BRIGHT_BRIGHTNESS,
        is_low_sat: avg_saturation < LOW_SATURATION,
        is_high_sat: avg_saturation > HIGH_SATURATION,
        histogram,
        dynamic_range,
    })
}

/// Full-resolution per-channel mean and standard deviation, one parallel pass.
fn brightness_and_range(image: &RgbaImage) -> (f32, f32) {
    let row_len = image.width() as usize * 4;
    let pixel_count = (image.width() * image.height()) as f64;

    // (sum, sum of squares) per channel
    let (sums, squares) = image
        .par_chunks_exact(row_len)
        .fold(
            || ([0.0f64; 3], [0.0f64; 3]),
            |(mut sums, mut squares), row| {
                for px in row.chunks_exact(4) {
                    for c in 0..3 {
                        let v = px[c] as f64;
                        sums[c] += v;
                        squares[c] += v * v;
                    }
                }
                (sums, squares)
            },
        )
        .reduce(
            || ([0.0f64; 3], [0.0f64; 3]),
            |(a_s, a_q), (b_s, b_q)| {
                (
                    [a_s[0] + b_s[0], a_s[1] + b_s[1], a_s[2] + b_s[2]],
                    [a_q[0] + b_q[0], a_q[1] + b_q[1], a_q[2] + b_q[2]],
                )
            },
        );

    let mut mean_total = 0.0f64;
    let mut stdev_total = 0.0f64;
    for c in 0..3 {
        let mean = sums[c] / pixel_count;
        let variance = (squares[c] / pixel_count - mean * mean).max(0.0);
        mean_total += mean;
        stdev_total += variance.sqrt();
    }

    let avg_brightness = (mean_total / 3.0) as f32;
    let avg_stdev = (stdev_total / 3.0) as f32;
    let dynamic_range = (avg_stdev / 255.0 * 200.0).min(100.0);

    (avg_brightness, dynamic_range)
}

/// Downsample to fit within [`STATS_MAX_DIMENSION`] preserving aspect ratio.
fn bounded_thumbnail(image: &RgbaImage) -> RgbaImage {
    let (w, h) = (image.width(), image.height());
    if w <= STATS_MAX_DIMENSION && h <= STATS_MAX_DIMENSION {
        return image.clone();
    }

    let scale = (STATS_MAX_DIMENSION as f32 / w as f32)
        .min(STATS_MAX_DIMENSION as f32 / h as f32);
    let tw = ((w as f32 * scale).round() as u32).max(1);
    let th = ((h as f32 * scale).round() as u32).max(1);
    imageops::thumbnail(image, tw, th)
}

/// Mean HSL saturation and the three-bucket histogram, one pass.
fn saturation_and_histogram(image: &RgbaImage) -> (f32, ToneHistogram) {
    let mut total_saturation = 0.0f64;
    let mut shadows = 0u32;
    let mut midtones = 0u32;
    let mut highlights = 0u32;
    let mut count = 0u32;

    for px in image.chunks_exact(4) {
        let brightness = (px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0;
        if brightness <= 85.0 {
            shadows += 1;
        } else if brightness <= 170.0 {
            midtones += 1;
        } else {
            highlights += 1;
        }

        let r = px[0] as f32 / 255.0;
        let g = px[1] as f32 / 255.0;
        let b = px[2] as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        let s = if max == min {
            0.0
        } else if l > 0.5 {
            (max - min) / (2.0 - max - min)
        } else {
            (max - min) / (max + min)
        };

        total_saturation += s as f64;
        count += 1;
    }

    let n = count.max(1) as f32;
    (
        (total_saturation / n as f64) as f32,
        ToneHistogram {
            shadows: shadows as f32 / n,
            midtones: midtones as f32 / n,
            highlights: highlights as f32 / n,
        },
    )
}

/// Build statistics directly from the raw measurements, bypassing pixel
/// analysis. Shared by classifier and validator tests.
#[cfg(test)]
pub(crate) fn synthetic_stats(
    avg_brightness: f32,
    avg_saturation: f32,
    shadows: f32,
    highlights: f32,
    dynamic_range: f32,
) -> ImageStatistics {
    let midtones = (1.0 - shadows - highlights).max(0.0);
    ImageStatistics {
        avg_brightness,
        avg_saturation,
        is_dark: avg_brightness < DARK_BRIGHTNESS,
        is_bright: avg_brightness > BRIGHT_BRIGHTNESS,
        is_low_sat: avg_saturation < LOW_SATURATION,
        is_high_sat: avg_saturation > HIGH_SATURATION,
        histogram: ToneHistogram {
            shadows,
            midtones,
            highlights,
        },
        dynamic_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::adjust::SourceFormat;
    use image::Rgba;

    fn decoded(image: RgbaImage) -> DecodedImage {
        DecodedImage {
            format: SourceFormat::Jpeg,
            image,
        }
    }

    fn flat(w: u32, h: u32, rgba: [u8; 4]) -> DecodedImage {
        decoded(RgbaImage::from_pixel(w, h, Rgba(rgba)))
    }

    #[test]
    fn flat_midgray_is_all_midtones() {
        let stats = analyze_image_stats(&flat(16, 16, [128, 128, 128, 255])).unwrap();
        assert!((stats.avg_brightness - 128.0).abs() < 0.5);
        assert_eq!(stats.histogram.midtones, 1.0);
        assert_eq!(stats.dynamic_range, 0.0);
        assert!(!stats.is_dark && !stats.is_bright);
        assert!(stats.is_low_sat);
    }

    #[test]
    fn dark_image_sets_dark_flag_and_shadows() {
        let stats = analyze_image_stats(&flat(16, 16, [30, 30, 30, 255])).unwrap();
        assert!(stats.is_dark);
        assert_eq!(stats.histogram.shadows, 1.0);
    }

    #[test]
    fn bright_image_sets_bright_flag_and_highlights() {
        let stats = analyze_image_stats(&flat(16, 16, [220, 220, 220, 255])).unwrap();
        assert!(stats.is_bright);
        assert_eq!(stats.histogram.highlights, 1.0);
    }

    #[test]
    fn checkerboard_has_maximal_dynamic_range() {
        let mut img = RgbaImage::new(16, 16);
        for (x, y, px) in img.enumerate_pixels_mut() {
            let v = if (x + y) % 2 == 0 { 0 } else { 255 };
            *px = Rgba([v, v, v, 255]);
        }
        let stats = analyze_image_stats(&decoded(img)).unwrap();
        // stdev = 127.5 → (127.5/255)*200 = 100, capped.
        assert!((stats.dynamic_range - 100.0).abs() < 1.0);
    }

    #[test]
    fn saturated_color_reads_as_high_saturation() {
        let stats = analyze_image_stats(&flat(16, 16, [255, 0, 0, 255])).unwrap();
        assert!(stats.avg_saturation > 0.9);
        assert!(stats.is_high_sat);
    }

    #[test]
    fn histogram_fractions_sum_to_one() {
        let mut img = RgbaImage::new(12, 12);
        for (x, _, px) in img.enumerate_pixels_mut() {
            let v = (x * 21) as u8;
            *px = Rgba([v, v, v, 255]);
        }
        let stats = analyze_image_stats(&decoded(img)).unwrap();
        let h = stats.histogram;
        assert!((h.shadows + h.midtones + h.highlights - 1.0).abs() < 1e-5);
    }

    #[test]
    fn large_input_is_downsampled_without_changing_flags() {
        // 600×300 flat image: thumbnail path must agree with direct path.
        let stats = analyze_image_stats(&flat(600, 300, [100, 150, 200, 255])).unwrap();
        assert!(stats.avg_saturation > 0.3);
        assert!((stats.avg_brightness - 150.0).abs() < 1.0);
    }
}
