//! Validation of untrusted analyzer estimates.
//!
//! Converts one raw estimate into bounded, self-consistent adjustment
//! parameters, given the statistics of the original image in the analyzed
//! pair. Range violations and logical inconsistencies each cost confidence;
//! a low-confidence estimate is discarded wholesale in favor of
//! scene-informed conservative defaults. Whatever path is taken, the result
//! passes a final clamp against the dynamic limit table before leaving —
//! the adjustment pipelines perform no clamping of their own.

use tracing::{info, warn};

use crate::models::{AdjustmentParameters, ColorGrading, FilterKind};

use super::image_type::detect_image_type;
use super::limits::{limits_for, DynamicLimits};
use super::raw::RawAdjustments;
use super::stats::ImageStatistics;

/// Below this confidence the estimate is replaced with conservative defaults.
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Confidence cost per out-of-range field.
const RANGE_PENALTY: f32 = 0.15;

/// Confidence cost per failed consistency heuristic.
const CONSISTENCY_PENALTY: f32 = 0.2;

/// Scored confidence is clamped to this band.
const CONFIDENCE_FLOOR: f32 = 0.1;
const CONFIDENCE_CEILING: f32 = 0.95;

/// Outcome of validating one raw estimate. Constructed once per estimate,
/// consumed immediately, never persisted.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub valid: bool,
    pub confidence: f32,
    pub warnings: Vec<String>,
    pub params: AdjustmentParameters,
    pub use_defaults: bool,
    pub reason: Option<String>,
}

/// Validate a raw analyzer estimate against the original image's statistics.
pub fn validate_analysis(raw: &RawAdjustments, stats: &ImageStatistics) -> ValidationResult {
    let image_type = detect_image_type(stats);
    let limits = limits_for(image_type);

    info!(
        image_type = %image_type,
        avg_brightness = format!("{:.1}", stats.avg_brightness),
        dynamic_range = format!("{:.1}", stats.dynamic_range),
        "Image type detected for validation"
    );

    let mut warnings = Vec::new();
    let mut confidence = 1.0f32;

    let range_issues = check_parameter_ranges(raw, &limits);
    confidence -= RANGE_PENALTY * range_issues.len() as f32;
    warnings.extend(range_issues);

    let consistency_issues = check_consistency(raw, stats);
    confidence -= CONSISTENCY_PENALTY * consistency_issues.len() as f32;
    warnings.extend(consistency_issues);

    let quality = parameter_quality(raw);
    let confidence = (confidence.min(CONFIDENCE_CEILING) * quality).max(CONFIDENCE_FLOOR);

    if confidence < CONFIDENCE_THRESHOLD {
        warn!(
            confidence = format!("{confidence:.2}"),
            warning_count = warnings.len(),
            "Analyzer estimate rejected - using conservative defaults"
        );
        return ValidationResult {
            valid: false,
            confidence,
            warnings,
            params: conservative_defaults(stats),
            use_defaults: true,
            reason: Some(format!(
                "Confidence too low ({confidence:.2} < {CONFIDENCE_THRESHOLD})"
            )),
        };
    }

    if !warnings.is_empty() {
        let adjusted = adjust_suspicious(raw, &warnings, stats);
        warn!(
            warning_count = warnings.len(),
            "Analyzer estimate accepted with corrections"
        );
        return ValidationResult {
            valid: true,
            confidence,
            warnings,
            params: clamp_with_limits(&adjusted, &limits),
            use_defaults: false,
            reason: None,
        };
    }

    ValidationResult {
        valid: true,
        confidence,
        warnings,
        params: clamp_with_limits(raw, &limits),
        use_defaults: false,
        reason: None,
    }
}

/// Range check against the scene's dynamic limits, plus the fixed bounds on
/// temperature/tint. One warning per violating field.
fn check_parameter_ranges(raw: &RawAdjustments, limits: &DynamicLimits) -> Vec<String> {
    let mut issues = Vec::new();

    let mut check = |name: &str, value: Option<f32>, range: &super::limits::Range| {
        if let Some(v) = value {
            if !range.contains(v) {
                issues.push(format!(
                    "{name} out of range: {v} (allowed: {}-{})",
                    range.min, range.max
                ));
            }
        }
    };

    check("brightness", raw.brightness, &limits.brightness);
    check("contrast", raw.contrast, &limits.contrast);
    check("saturation", raw.saturation, &limits.saturation);
    check("sharpness", raw.sharpness, &limits.sharpness);
    check("dehaze", raw.dehaze, &limits.dehaze);
    check("clarity", raw.clarity, &limits.clarity);
    check(
        "selectiveColorIntensity",
        raw.selective_color_intensity,
        &limits.selective_color_intensity,
    );

    if let Some(t) = raw.temperature {
        if t.abs() > 100.0 {
            issues.push(format!("temperature too extreme: {t}"));
        }
    }
    if let Some(t) = raw.tint {
        if t.abs() > 100.0 {
            issues.push(format!("tint too extreme: {t}"));
        }
    }

    issues
}

/// Logical consistency between the image's character and the estimate.
fn check_consistency(raw: &RawAdjustments, stats: &ImageStatistics) -> Vec<String> {
    let mut issues = Vec::new();

    if let Some(b) = raw.brightness {
        if stats.is_bright && b > 1.3 {
            issues.push(format!(
                "bright image (avg {:.0}) but brightness={b} - suspicious",
                stats.avg_brightness
            ));
        }
        if stats.is_dark && b < 0.9 {
            issues.push(format!(
                "dark image (avg {:.0}) but brightness={b} - suspicious",
                stats.avg_brightness
            ));
        }
    }

    if let Some(s) = raw.saturation {
        if stats.is_high_sat && s > 1.3 {
            issues.push(format!(
                "highly saturated image but saturation={s} - oversaturation risk"
            ));
        }
        if stats.is_low_sat && s < 0.8 {
            issues.push(format!(
                "low saturation image but saturation={s} - may look grayscale"
            ));
        }
    }

    if let Some(sci) = raw.selective_color_intensity {
        if sci > 1.5 {
            issues.push(format!(
                "selectiveColorIntensity={sci} - color cast risk"
            ));
        }
    }

    if let Some(c) = raw.contrast {
        if c > 1.4 {
            issues.push(format!("contrast={c} - detail loss risk"));
        }
    }

    issues
}

/// Quality score (0.1–1.0) from the estimate's shape alone.
fn parameter_quality(raw: &RawAdjustments) -> f32 {
    let mut score = 1.0f32;

    let deviations = [
        (raw.brightness.unwrap_or(1.0) - 1.0).abs(),
        (raw.contrast.unwrap_or(1.0) - 1.0).abs(),
        (raw.saturation.unwrap_or(1.0) - 1.0).abs(),
        (raw.sharpness.unwrap_or(1.0) - 1.0).abs(),
    ];
    let avg_deviation: f32 = deviations.iter().sum::<f32>() / deviations.len() as f32;

    if avg_deviation > 0.5 {
        score *= 0.7;
    } else if avg_deviation > 0.3 {
        score *= 0.85;
    }

    // Everything at defaults reads as "no change detected" — suspicious for
    // a pair the user claims was edited.
    let all_defaults = deviations.iter().all(|d| *d < 0.01)
        && raw.hue.unwrap_or(0.0).abs() < 1.0
        && raw.temperature.unwrap_or(0.0).abs() < 1.0;
    if all_defaults {
        score *= 0.5;
    }

    if raw.selective_color_intensity.unwrap_or(0.0) > 1.3 {
        score *= 0.8;
    }

    score.max(0.1)
}

/// Scene-informed conservative defaults used when the estimate is rejected.
fn conservative_defaults(stats: &ImageStatistics) -> AdjustmentParameters {
    AdjustmentParameters {
        brightness: if stats.is_dark {
            1.1
        } else if stats.is_bright {
            0.95
        } else {
            1.0
        },
        contrast: 1.05,
        saturation: if stats.is_low_sat { 1.1 } else { 1.05 },
        vibrance: Some(1.05),
        sharpness: 1.1,
        ..AdjustmentParameters::neutral()
    }
}

/// Targeted corrections for an estimate that drew warnings but stays usable.
fn adjust_suspicious(
    raw: &RawAdjustments,
    warnings: &[String],
    stats: &ImageStatistics,
) -> RawAdjustments {
    let mut adjusted = raw.clone();

    for warning in warnings {
        if warning.contains("brightness") && warning.contains("suspicious") {
            if let Some(b) = adjusted.brightness {
                if stats.is_bright && b > 1.2 {
                    adjusted.brightness = Some(1.0 + (b - 1.0) * 0.5);
                    info!(original = b, adjusted = ?adjusted.brightness, "Halved suspicious brightness excess");
                }
            }
        }

        if warning.contains("oversaturation") {
            if let Some(s) = adjusted.saturation {
                adjusted.saturation = Some(s.min(1.25));
            }
        }

        if warning.contains("color cast") {
            if let Some(sci) = adjusted.selective_color_intensity {
                adjusted.selective_color_intensity = Some(sci.min(1.2));
            }
        }

        if warning.contains("detail loss") {
            if let Some(c) = adjusted.contrast {
                adjusted.contrast = Some(c.min(1.25));
            }
        }
    }

    adjusted
}

/// Materialize a raw estimate into trusted parameters, clamping every field.
///
/// This runs after validation decisions as defense in depth; nothing leaves
/// the validator outside the scene's dynamic limits.
fn clamp_with_limits(raw: &RawAdjustments, limits: &DynamicLimits) -> AdjustmentParameters {
    let clamp_i32 =
        |v: Option<f32>, lo: f32, hi: f32| v.map(|v| v.clamp(lo, hi).round() as i32);

    AdjustmentParameters {
        brightness: limits.brightness.clamp(raw.brightness.unwrap_or(1.0)),
        contrast: limits.contrast.clamp(raw.contrast.unwrap_or(1.0)),
        saturation: limits.saturation.clamp(raw.saturation.unwrap_or(1.0)),
        vibrance: raw.vibrance.map(|v| v.clamp(0.5, 1.3)),
        hue: raw.hue.unwrap_or(0.0).clamp(-50.0, 50.0).round() as i32,
        temperature: raw.temperature.unwrap_or(0.0).clamp(-50.0, 50.0).round() as i32,
        tint: raw.tint.unwrap_or(0.0).clamp(-50.0, 50.0).round() as i32,
        exposure: raw.exposure.map(|v| v.clamp(-1.0, 1.0)),

        sharpness: limits.sharpness.clamp(raw.sharpness.unwrap_or(1.0)),
        clarity: raw.clarity.map(|v| limits.clarity.clamp(v)),
        dehaze: raw.dehaze.map(|v| limits.dehaze.clamp(v)),
        grain: raw.grain.map(|v| v.clamp(0.0, 0.5)),

        highlights: clamp_i32(raw.highlights, -100.0, 100.0),
        shadows: clamp_i32(raw.shadows, -100.0, 100.0),
        whites: clamp_i32(raw.whites, -100.0, 100.0),
        blacks: clamp_i32(raw.blacks, -100.0, 100.0),

        skin_smoothing: raw.skin_smoothing.map(|v| v.clamp(0.0, 1.0)),
        blemish_removal: raw.blemish_removal,
        eye_brightening: raw.eye_brightening.map(|v| v.clamp(0.0, 1.0)),
        teeth_whitening: raw.teeth_whitening.map(|v| v.clamp(0.0, 1.0)),
        face_slimming: raw.face_slimming.map(|v| v.clamp(0.0, 0.5)),
        body_retouching: raw.body_retouching,
        makeup_enhancement: raw.makeup_enhancement,

        sky_enhancement: raw.sky_enhancement.map(|v| v.clamp(0.0, 1.0)),
        foliage_enhancement: raw.foliage_enhancement.map(|v| v.clamp(0.0, 1.0)),
        water_enhancement: raw.water_enhancement.map(|v| v.clamp(0.0, 1.0)),
        landscape_clarity: raw.landscape_clarity.map(|v| v.clamp(0.0, 2.0)),
        natural_saturation: raw.natural_saturation.map(|v| v.clamp(0.0, 1.0)),
        dynamic_range: raw.dynamic_range.map(|v| v.clamp(0.0, 1.0)),
        atmospheric_perspective: raw.atmospheric_perspective.map(|v| v.clamp(0.0, 1.0)),

        selective_color_intensity: raw
            .selective_color_intensity
            .map(|v| limits.selective_color_intensity.clamp(v)),

        vignette: raw.vignette.map(|v| v.clamp(-1.0, 1.0)),
        denoise: raw.denoise.map(|v| v.clamp(0.0, 1.0)),
        color_grading: raw.color_grading.clone().map(ColorGrading::from),
        filters: raw.filters.iter().cloned().map(FilterKind::from).collect(),
    }
}
