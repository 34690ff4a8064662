//! Selective color enhancement for landscape photos.
//!
//! A single RGB→HSL→RGB sweep that boosts saturation only inside four
//! hue/lightness bands (sky blues, water cyans, foliage greens, warm autumn
//! tones). No spatial masking: a pixel either falls in a band or it does not.
//! Pixels that are already near-neutral (rock, concrete, skin in shadow) are
//! skipped so the boost never invents color.

use image::RgbaImage;
use rayon::prelude::*;
use tracing::{debug, info};

use super::buffer::{encode_jpeg, DecodedImage};
use super::color::{hsl_to_rgb, rgb_to_hsl};
use super::AdjustError;

/// Pixels at or below this saturation are left untouched.
const NEUTRAL_SATURATION: f32 = 0.2;

/// Band boost factors, scaled by the caller's intensity.
const SKY_BLUE_BOOST: f32 = 0.08;
const WATER_CYAN_BOOST: f32 = 0.10;
const FOLIAGE_GREEN_BOOST: f32 = 0.08;
const WARM_AUTUMN_BOOST: f32 = 0.06;

/// Saturation boost for one pixel's hue/lightness position. The four bands
/// are disjoint in hue; lightness gates keep near-black and near-white
/// pixels out of each band.
fn band_boost(h: f32, l: f32) -> f32 {
    // Sky blues: narrow pure-blue range, 240 inclusive
    if (220.0..=240.0).contains(&h) && l > 0.4 && l < 0.85 {
        SKY_BLUE_BOOST
    // Water cyans: blue-leaning cyan
    } else if (195.0..220.0).contains(&h) && l > 0.35 && l < 0.8 {
        WATER_CYAN_BOOST
    // Foliage greens
    } else if (100.0..135.0).contains(&h) && l > 0.25 && l < 0.75 {
        FOLIAGE_GREEN_BOOST
    // Warm autumn yellows
    } else if (50.0..70.0).contains(&h) && l > 0.35 && l < 0.75 {
        WARM_AUTUMN_BOOST
    } else {
        0.0
    }
}

/// Boost saturation of landscape hue bands across a whole buffer, in place.
///
/// `intensity` scales every band factor (0.0–2.0 in practice). The pass is
/// pure per-pixel work with no neighborhood dependency, so rows run in
/// parallel. Alpha passes through unmodified.
pub fn enhance_pixels(image: &mut RgbaImage, intensity: f32) {
    let row_len = image.width() as usize * 4;
    image
        .par_chunks_exact_mut(row_len)
        .for_each(|row| {
            for px in row.chunks_exact_mut(4) {
                let (h, s, l) = rgb_to_hsl(
                    px[0] as f32 / 255.0,
                    px[1] as f32 / 255.0,
                    px[2] as f32 / 255.0,
                );

                // Near-neutral pixels must not be pushed toward color.
                if s <= NEUTRAL_SATURATION {
                    continue;
                }

                let boost = intensity * band_boost(h, l);
                if boost == 0.0 {
                    continue;
                }

                let new_s = (s + boost).min(1.0);
                let (r, g, b) = hsl_to_rgb(h, new_s, l);
                px[0] = (r * 255.0).round().clamp(0.0, 255.0) as u8;
                px[1] = (g * 255.0).round().clamp(0.0, 255.0) as u8;
                px[2] = (b * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        });
}

/// Apply landscape enhancement to encoded image bytes and re-encode.
///
/// Runs as a post-process on the adaptive pipeline's output; always encodes
/// high-quality JPEG.
pub fn apply_landscape_enhancement(bytes: &[u8], intensity: f32) -> Result<Vec<u8>, AdjustError> {
    let start = std::time::Instant::now();
    let mut decoded = DecodedImage::from_bytes(bytes)?;

    debug!(
        width = decoded.width(),
        height = decoded.height(),
        intensity,
        "Applying selective color enhancement"
    );

    enhance_pixels(&mut decoded.image, intensity);
    let out = encode_jpeg(&decoded.image)?;

    info!(
        elapsed_ms = %start.elapsed().as_millis(),
        input_size = bytes.len(),
        output_size = out.len(),
        "Selective color enhancement complete"
    );

    Ok(out)
}
