//! Standard adjustment pipeline.
//!
//! Applies a validated parameter set to an image in a fixed stage order:
//! tone → color → denoise → detail → effects. The order is a correctness
//! contract — denoise must run before sharpening so noise is not amplified,
//! tone before color so modulation sees the corrected range. Reordering
//! changes visual results and must not be done.
//!
//! The pipeline performs no clamping: parameters are trusted to have passed
//! the validator already.

use image::RgbaImage;
use tracing::{debug, warn};

use crate::models::{AdjustmentParameters, ColorGrading, FilterKind};

use super::buffer::DecodedImage;
use super::ops;
use super::AdjustError;

/// Identifies one applied operation, in execution order. Used for debug
/// tracing and for asserting stage order in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedOp {
    Exposure,
    ToneCurve,
    Modulate,
    Vibrance,
    Contrast,
    Temperature,
    Denoise,
    Clarity,
    Sharpen,
    Dehaze,
    SkinSmoothing,
    ColorGrading,
    Filter,
}

/// Apply the standard pipeline and encode the result (lossless sources stay
/// lossless, everything else becomes high-quality JPEG).
pub fn apply_adjustments(
    mut image: DecodedImage,
    params: &AdjustmentParameters,
) -> Result<Vec<u8>, AdjustError> {
    let mut log = Vec::new();
    run_pipeline(&mut image.image, params, &mut log);
    debug!(ops = ?log, "Standard pipeline complete");
    image.encode()
}

/// The pipeline body, separated so tests can observe the operation order.
pub(crate) fn run_pipeline(
    img: &mut RgbaImage,
    params: &AdjustmentParameters,
    log: &mut Vec<AppliedOp>,
) {
    // ── Stage 1: tone ───────────────────────────────────────────────
    if let Some(exposure) = params.exposure {
        if exposure != 0.0 {
            ops::linear(img, 2f32.powf(exposure), 0.0);
            log.push(AppliedOp::Exposure);
        }
    }

    let shadows = params.shadows.unwrap_or(0) as f32 / 100.0;
    let highlights = params.highlights.unwrap_or(0) as f32 / 100.0;
    if shadows != 0.0 || highlights != 0.0 {
        ops::linear(img, 1.0 + highlights * 0.3, shadows * 30.0);
        log.push(AppliedOp::ToneCurve);
    }

    // ── Stage 2: color ──────────────────────────────────────────────
    if params.brightness != 1.0 || params.saturation != 1.0 || params.hue != 0 {
        ops::modulate(img, params.brightness, params.saturation, params.hue as f32);
        log.push(AppliedOp::Modulate);
    }

    if let Some(vibrance) = params.vibrance {
        // Dampened secondary saturation nudge.
        let boost = (vibrance - 1.0) * 0.2;
        if boost != 0.0 {
            ops::modulate(img, 1.0, 1.0 + boost, 0.0);
            log.push(AppliedOp::Vibrance);
        }
    }

    if params.contrast != 1.0 {
        ops::linear(img, params.contrast, (1.0 - params.contrast) * 128.0);
        log.push(AppliedOp::Contrast);
    }

    if params.temperature != 0 || params.tint != 0 {
        let temp = params.temperature as f32 / 100.0;
        let tint = params.tint as f32 / 100.0;
        ops::recomb(
            img,
            [
                [1.0 + temp * 0.3, 0.0, 0.0],
                [0.0, 1.0 - tint.abs() * 0.2, 0.0],
                [0.0, 0.0, 1.0 - temp * 0.3 + tint * 0.2],
            ],
        );
        log.push(AppliedOp::Temperature);
    }

    // ── Stage 3: denoise (before any sharpening) ────────────────────
    if let Some(denoise) = params.denoise {
        if denoise > 0.0 {
            ops::median_filter(img, (denoise * 5.0).ceil() as u32);
            log.push(AppliedOp::Denoise);
        }
    }

    // ── Stage 4: detail ─────────────────────────────────────────────
    if let Some(clarity) = params.clarity {
        if clarity > 0.0 {
            ops::convolve3x3(
                img,
                [
                    -1.0,
                    -1.0,
                    -1.0,
                    -1.0,
                    8.0 + clarity * 3.0,
                    -1.0,
                    -1.0,
                    -1.0,
                    -1.0,
                ],
            );
            log.push(AppliedOp::Clarity);
        }
    }

    if params.sharpness > 1.0 {
        ops::sharpen(img, (params.sharpness - 1.0) * 1.5);
        log.push(AppliedOp::Sharpen);
    }

    if let Some(dehaze) = params.dehaze {
        if dehaze > 0.0 {
            ops::modulate(img, 1.0, 1.0 + dehaze * 0.3, 0.0);
            ops::linear(img, 1.0 + dehaze * 0.2, 0.0);
            log.push(AppliedOp::Dehaze);
        }
    }

    // ── Stage 5: effects ────────────────────────────────────────────
    if let Some(vignette) = params.vignette {
        if vignette != 0.0 {
            // Placeholder: edge shading needs a compositing pass.
            debug!(strength = vignette, "Vignette requested - not applied");
        }
    }

    if let Some(smoothing) = params.skin_smoothing {
        if smoothing > 0.0 {
            ops::gaussian_blur(img, smoothing * 3.0);
            log.push(AppliedOp::SkinSmoothing);
        }
    }

    if let Some(grain) = params.grain {
        if grain > 0.0 {
            debug!(grain, "Film grain requested - not applied");
        }
    }

    if let Some(grading) = &params.color_grading {
        if apply_color_grading(img, grading) {
            log.push(AppliedOp::ColorGrading);
        }
    }

    for filter in &params.filters {
        if apply_filter(img, filter) {
            log.push(AppliedOp::Filter);
        }
    }
}

/// Fixed grading presets: saturation/brightness modulation plus a channel
/// recombination matrix. Returns whether anything was applied.
fn apply_color_grading(img: &mut RgbaImage, grading: &ColorGrading) -> bool {
    match grading {
        ColorGrading::WarmVintage => {
            ops::modulate(img, 1.0, 0.8, 0.0);
            ops::recomb(
                img,
                [[1.2, 0.1, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.8]],
            );
            true
        }
        ColorGrading::CoolModern => {
            ops::modulate(img, 1.0, 1.1, 0.0);
            ops::recomb(
                img,
                [[0.9, 0.0, 0.0], [0.0, 1.0, 0.05], [0.0, 0.0, 1.1]],
            );
            true
        }
        ColorGrading::Cinematic => {
            ops::modulate(img, 0.95, 0.9, 0.0);
            ops::recomb(
                img,
                [[1.1, 0.05, 0.0], [0.05, 1.0, 0.05], [0.0, 0.05, 0.95]],
            );
            true
        }
        ColorGrading::None => false,
        ColorGrading::Unknown(name) => {
            warn!(style = %name, "Unknown color grading style");
            false
        }
    }
}

/// Ordered post-pipeline filters. Unknown names are tolerated (a stored
/// profile may come from a newer build) and log a warning.
fn apply_filter(img: &mut RgbaImage, filter: &FilterKind) -> bool {
    match filter {
        FilterKind::Denoise => {
            ops::median_filter(img, 3);
            true
        }
        FilterKind::SoftFocus => {
            ops::gaussian_blur(img, 2.0);
            true
        }
        FilterKind::SkinSmoothing => {
            ops::gaussian_blur(img, 1.5);
            true
        }
        FilterKind::Hdr => {
            ops::linear(img, 1.3, -15.0);
            ops::modulate(img, 1.0, 0.9, 0.0);
            true
        }
        FilterKind::Glow => {
            ops::gaussian_blur(img, 0.5);
            ops::linear(img, 1.1, 5.0);
            true
        }
        FilterKind::Vignette => {
            debug!("Vignette filter requested - not applied");
            false
        }
        FilterKind::Unknown(name) => {
            warn!(filter = %name, "Unknown filter");
            false
        }
    }
}
