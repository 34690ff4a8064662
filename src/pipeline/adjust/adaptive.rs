//! Adaptive correction pipeline.
//!
//! The variant used when a saved profile is applied to a new photo. Before
//! anything runs, the profile's parameters are rescaled against the *target*
//! image's own brightness so a style trained on ordinary daylight shots does
//! not blow out an already-bright photo or amplify noise in a dark one.
//! The subsequent stage sequence matches the standard pipeline but with
//! gentler constants throughout.
//!
//! The deprecated landscape fields (naturalSaturation, dynamicRange,
//! atmosphericPerspective, landscapeClarity) keep their small independent
//! nudges here for profiles stored before they were retired; the analyzer
//! forces them to zero in new profiles.

use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::models::{AdjustmentParameters, ColorGrading, FilterKind};
use crate::pipeline::analysis::analyze_image_stats;
use crate::pipeline::analysis::stats::ImageStatistics;

use super::buffer::DecodedImage;
use super::ops;
use super::selective;
use super::standard::AppliedOp;
use super::AdjustError;

/// Result of an adaptive correction: encoded output plus the parameters that
/// were actually applied after target-aware rescaling.
#[derive(Debug, Clone)]
pub struct AdaptiveOutcome {
    pub bytes: Vec<u8>,
    pub applied: AdjustmentParameters,
}

/// Rescale profile parameters against the target image's brightness.
///
/// Very bright (>220) and very dark (<60) targets dampen the profile;
/// mid-range targets trust it unchanged.
pub fn adapt_parameters(
    params: &AdjustmentParameters,
    stats: &ImageStatistics,
) -> AdjustmentParameters {
    let mut adapted = params.clone();

    if stats.avg_brightness > 220.0 {
        if adapted.brightness > 1.15 {
            adapted.brightness = 1.0 + (adapted.brightness - 1.0) * 0.9;
            info!(
                original = params.brightness,
                adapted = adapted.brightness,
                "Very bright target - brightness slightly reduced"
            );
        }
    } else if stats.avg_brightness < 60.0 {
        if adapted.brightness > 1.2 {
            adapted.brightness = 1.0 + (adapted.brightness - 1.0) * 0.85;
        }
        if adapted.sharpness > 1.15 {
            adapted.sharpness = 1.0 + (adapted.sharpness - 1.0) * 0.8;
        }
        // Dark frames always get at least a little noise reduction.
        adapted.denoise = Some(adapted.denoise.unwrap_or(0.0).max(0.2));
        info!(
            brightness = adapted.brightness,
            sharpness = adapted.sharpness,
            "Very dark target - adjustments dampened for noise control"
        );
    }

    adapted
}

/// Apply a saved profile to a new photo: analyze the target, rescale the
/// parameters, run the gentler pipeline, then post-process selective color
/// if the profile asks for it.
pub fn apply_adaptive_correction(
    mut image: DecodedImage,
    params: &AdjustmentParameters,
) -> Result<AdaptiveOutcome, AdjustError> {
    let stats = analyze_image_stats(&image).map_err(|_| AdjustError::EmptyImage)?;

    debug!(
        width = image.width(),
        height = image.height(),
        avg_brightness = format!("{:.1}", stats.avg_brightness),
        "Adaptive correction starting"
    );

    let applied = adapt_parameters(params, &stats);

    let mut log = Vec::new();
    run_pipeline(&mut image.image, &applied, &mut log);
    debug!(ops = ?log, "Adaptive pipeline complete");

    let mut bytes = image.encode()?;

    if let Some(intensity) = applied.selective_color_intensity {
        if intensity > 0.0 {
            info!(intensity, "Applying selective color post-process");
            bytes = selective::apply_landscape_enhancement(&bytes, intensity)?;
        }
    }

    Ok(AdaptiveOutcome { bytes, applied })
}

/// The adaptive stage sequence. Same shape as the standard pipeline, gentler
/// constants.
pub(crate) fn run_pipeline(
    img: &mut RgbaImage,
    params: &AdjustmentParameters,
    log: &mut Vec<AppliedOp>,
) {
    // ── Stage 1: tone ───────────────────────────────────────────────
    if let Some(exposure) = params.exposure {
        if exposure != 0.0 {
            // Dampened exponent keeps reapplied exposure shifts subtle.
            ops::linear(img, 2f32.powf(exposure * 0.8), 0.0);
            log.push(AppliedOp::Exposure);
        }
    }

    let shadows = params.shadows.unwrap_or(0) as f32 / 150.0;
    let highlights = params.highlights.unwrap_or(0) as f32 / 150.0;
    if shadows != 0.0 || highlights != 0.0 {
        ops::linear(img, 1.0 + highlights * 0.2, shadows * 20.0);
        log.push(AppliedOp::ToneCurve);
    }

    // ── Stage 2: color ──────────────────────────────────────────────
    if params.brightness != 1.0 || params.saturation != 1.0 || params.hue != 0 {
        ops::modulate(img, params.brightness, params.saturation, params.hue as f32);
        log.push(AppliedOp::Modulate);
    }

    if let Some(vibrance) = params.vibrance {
        // Only boosts; a profile cannot desaturate through vibrance here.
        if vibrance > 1.0 {
            let boost = (vibrance - 1.0) * 0.2;
            ops::modulate(img, 1.0, 1.0 + boost, 0.0);
            log.push(AppliedOp::Vibrance);
        }
    }

    if params.contrast != 1.0 {
        ops::linear(img, params.contrast, (1.0 - params.contrast) * 128.0);
        log.push(AppliedOp::Contrast);
    }

    if params.temperature != 0 || params.tint != 0 {
        let temp = params.temperature as f32 / 150.0;
        let tint = params.tint as f32 / 150.0;
        ops::recomb(
            img,
            [
                [1.0 + temp * 0.2, 0.0, 0.0],
                [0.0, 1.0 - tint.abs() * 0.15, 0.0],
                [0.0, 0.0, 1.0 - temp * 0.2 + tint * 0.15],
            ],
        );
        log.push(AppliedOp::Temperature);
    }

    // ── Stage 3: denoise (before detail work) ───────────────────────
    if let Some(denoise) = params.denoise {
        if denoise > 0.0 {
            let size = ((denoise * 3.0).ceil() as u32).min(5);
            ops::median_filter(img, size);
            log.push(AppliedOp::Denoise);
        }
    }

    // ── Stage 4: detail ─────────────────────────────────────────────
    if let Some(clarity) = params.clarity {
        if clarity > 1.0 {
            let strength = (clarity - 1.0) * 0.7;
            // Sub-threshold clarity would only jitter noise.
            if strength > 0.03 {
                ops::clarity_boost(img, 0.5 + strength * 0.8);
                log.push(AppliedOp::Clarity);
            }
        }
    }

    if params.sharpness > 1.0 {
        let sigma = ((params.sharpness - 1.0) * 0.8).min(2.0);
        ops::sharpen(img, sigma);
        log.push(AppliedOp::Sharpen);
    }

    if let Some(dehaze) = params.dehaze {
        if dehaze > 0.0 {
            let strength = dehaze * 0.6;
            ops::modulate(img, 1.0, 1.0 + strength * 0.2, 0.0);
            ops::linear(img, 1.0 + strength * 0.15, 0.0);
            log.push(AppliedOp::Dehaze);
        }
    }

    // Vestigial landscape fields: inert at zero/absent.
    if let Some(lc) = params.landscape_clarity {
        if lc > 0.0 {
            ops::sharpen(img, (lc * 0.6).min(1.5));
        }
    }
    if let Some(ns) = params.natural_saturation {
        if ns > 0.0 {
            ops::modulate(img, 1.0, 1.0 + ns * 0.5, 0.0);
        }
    }
    if let Some(dr) = params.dynamic_range {
        if dr > 0.0 {
            let strength = dr * 0.6;
            ops::linear(img, 1.0 + strength * 0.2, strength * 8.0);
        }
    }
    if let Some(ap) = params.atmospheric_perspective {
        if ap > 0.0 {
            let boost = 1.0 + ap * 0.35;
            ops::linear(img, boost, (1.0 - boost) * 128.0);
        }
    }

    // ── Stage 5: effects ────────────────────────────────────────────
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

/// Grading presets with the gentler adaptive constants.
fn apply_color_grading(img: &mut RgbaImage, grading: &ColorGrading) -> bool {
    match grading {
        ColorGrading::WarmVintage => {
            ops::modulate(img, 1.0, 0.85, 0.0);
            ops::recomb(
                img,
                [[1.15, 0.05, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.85]],
            );
            true
        }
        ColorGrading::CoolModern => {
            ops::modulate(img, 1.0, 1.05, 0.0);
            ops::recomb(
                img,
                [[0.95, 0.0, 0.0], [0.0, 1.0, 0.02], [0.0, 0.0, 1.05]],
            );
            true
        }
        ColorGrading::Cinematic => {
            ops::modulate(img, 0.98, 0.95, 0.0);
            ops::recomb(
                img,
                [[1.05, 0.02, 0.0], [0.02, 1.0, 0.02], [0.0, 0.02, 0.97]],
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

/// Post-pipeline filters with the gentler adaptive constants.
fn apply_filter(img: &mut RgbaImage, filter: &FilterKind) -> bool {
    match filter {
        FilterKind::Denoise => {
            ops::median_filter(img, 2);
            true
        }
        FilterKind::SoftFocus => {
            ops::gaussian_blur(img, 1.0);
            true
        }
        FilterKind::SkinSmoothing => {
            ops::gaussian_blur(img, 0.8);
            true
        }
        FilterKind::Hdr => {
            ops::linear(img, 1.2, -10.0);
            ops::modulate(img, 1.0, 0.95, 0.0);
            true
        }
        FilterKind::Glow => {
            ops::gaussian_blur(img, 0.3);
            ops::linear(img, 1.05, 3.0);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::adjust::SourceFormat;
    use crate::pipeline::analysis::stats::synthetic_stats;
    use image::Rgba;

    fn profile(brightness: f32, sharpness: f32) -> AdjustmentParameters {
        AdjustmentParameters {
            brightness,
            sharpness,
            ..AdjustmentParameters::neutral()
        }
    }

    // ── Parameter adaptation ────────────────────────────────────────

    #[test]
    fn very_bright_target_dampens_strong_brightening() {
        let stats = synthetic_stats(235.0, 0.3, 0.0, 0.9, 30.0);
        let adapted = adapt_parameters(&profile(1.3, 1.0), &stats);
        // Excess over 1.0 scaled by 0.9: 1.3 → 1.27.
        assert!((adapted.brightness - 1.27).abs() < 1e-3);
    }

    #[test]
    fn very_bright_target_leaves_mild_brightening_alone() {
        let stats = synthetic_stats(235.0, 0.3, 0.0, 0.9, 30.0);
        let adapted = adapt_parameters(&profile(1.1, 1.0), &stats);
        assert_eq!(adapted.brightness, 1.1);
    }

    #[test]
    fn very_dark_target_dampens_and_forces_denoise() {
        let stats = synthetic_stats(40.0, 0.2, 0.9, 0.0, 20.0);
        let adapted = adapt_parameters(&profile(1.4, 1.3), &stats);
        assert!((adapted.brightness - 1.34).abs() < 1e-3); // 1 + 0.4*0.85
        assert!((adapted.sharpness - 1.24).abs() < 1e-3); // 1 + 0.3*0.8
        assert_eq!(adapted.denoise, Some(0.2));
    }

    #[test]
    fn dark_target_keeps_existing_stronger_denoise() {
        let stats = synthetic_stats(40.0, 0.2, 0.9, 0.0, 20.0);
        let mut params = profile(1.0, 1.0);
        params.denoise = Some(0.5);
        let adapted = adapt_parameters(&params, &stats);
        assert_eq!(adapted.denoise, Some(0.5));
    }

    #[test]
    fn mid_brightness_target_passes_parameters_through() {
        let stats = synthetic_stats(130.0, 0.4, 0.2, 0.2, 45.0);
        let params = profile(1.3, 1.3);
        let adapted = adapt_parameters(&params, &stats);
        assert_eq!(adapted, params);
    }

    // ── Stage order ─────────────────────────────────────────────────

    #[test]
    fn denoise_runs_before_clarity_and_sharpen() {
        let mut params = profile(1.0, 1.4);
        params.denoise = Some(0.5);
        params.clarity = Some(1.3);

        let mut img = RgbaImage::from_pixel(8, 8, Rgba([100, 100, 100, 255]));
        let mut log = Vec::new();
        run_pipeline(&mut img, &params, &mut log);

        let denoise = log.iter().position(|op| *op == AppliedOp::Denoise).unwrap();
        let clarity = log.iter().position(|op| *op == AppliedOp::Clarity).unwrap();
        let sharpen = log.iter().position(|op| *op == AppliedOp::Sharpen).unwrap();
        assert!(denoise < clarity);
        assert!(clarity < sharpen);
    }

    #[test]
    fn sub_threshold_clarity_is_skipped() {
        let mut params = profile(1.0, 1.0);
        params.clarity = Some(1.02); // strength 0.014 < 0.03

        let mut img = RgbaImage::from_pixel(4, 4, Rgba([100, 100, 100, 255]));
        let mut log = Vec::new();
        run_pipeline(&mut img, &params, &mut log);
        assert!(!log.contains(&AppliedOp::Clarity));
    }

    #[test]
    fn vibrance_below_one_is_not_applied() {
        let mut params = profile(1.0, 1.0);
        params.vibrance = Some(0.9);

        let mut img = RgbaImage::from_pixel(4, 4, Rgba([120, 60, 60, 255]));
        let mut log = Vec::new();
        run_pipeline(&mut img, &params, &mut log);
        assert!(!log.contains(&AppliedOp::Vibrance));
    }

    #[test]
    fn denoise_window_is_capped() {
        // denoise 1.0 → ceil(3.0) = 3; even an out-of-band 2.0 caps at 5.
        let mut params = profile(1.0, 1.0);
        params.denoise = Some(2.0);
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([100, 100, 100, 255]));
        let mut log = Vec::new();
        run_pipeline(&mut img, &params, &mut log);
        assert!(log.contains(&AppliedOp::Denoise));
    }

    // ── End-to-end ──────────────────────────────────────────────────

    fn gradient_image(format: SourceFormat) -> DecodedImage {
        let mut img = RgbaImage::new(16, 16);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgba([(x * 14 + 20) as u8, (y * 14 + 20) as u8, 120, 255]);
        }
        DecodedImage { format, image: img }
    }

    #[test]
    fn correction_returns_applied_parameters() {
        let params = profile(1.3, 1.1);
        let outcome =
            apply_adaptive_correction(gradient_image(SourceFormat::Jpeg), &params).unwrap();
        // Mid-brightness target: parameters pass through unchanged.
        assert_eq!(outcome.applied.brightness, 1.3);
        assert!(!outcome.bytes.is_empty());
    }

    #[test]
    fn correction_is_deterministic() {
        let mut params = profile(1.3, 1.1);
        params.saturation = 1.2;
        let a = apply_adaptive_correction(gradient_image(SourceFormat::Png), &params).unwrap();
        let b = apply_adaptive_correction(gradient_image(SourceFormat::Png), &params).unwrap();
        assert_eq!(a.bytes, b.bytes);
    }

    #[test]
    fn selective_color_post_process_runs_when_requested() {
        let mut params = profile(1.0, 1.0);
        params.selective_color_intensity = Some(1.0);

        // PNG input would normally stay PNG; the selective pass re-encodes
        // as JPEG, which proves it ran.
        let outcome =
            apply_adaptive_correction(gradient_image(SourceFormat::Png), &params).unwrap();
        assert_eq!(
            image::guess_format(&outcome.bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn no_selective_color_keeps_lossless_output() {
        let params = profile(1.1, 1.0);
        let outcome =
            apply_adaptive_correction(gradient_image(SourceFormat::Png), &params).unwrap();
        assert_eq!(
            image::guess_format(&outcome.bytes).unwrap(),
            image::ImageFormat::Png
        );
    }
}
