//! Aggregation of several validated per-pair estimates into one profile.
//!
//! Pure combination rules: means over present values, majority vote for
//! booleans, appearance threshold for filters, mode for the grading preset.
//! No revalidation happens here — each sample was already bounded by the
//! validator, and means of bounded values remain bounded.

use crate::models::{AdjustmentParameters, ColorGrading, FilterKind};

use super::AnalysisError;

/// Combine N validated parameter sets (N ≥ 1) into one representative set.
///
/// A zero-length input is a programming-contract violation (upstream input
/// validation guarantees at least one pair) and returns `NoSamples`.
pub fn aggregate_parameters(
    samples: &[AdjustmentParameters],
) -> Result<AdjustmentParameters, AnalysisError> {
    let first = samples.first().ok_or(AnalysisError::NoSamples)?;
    if samples.len() == 1 {
        return Ok(first.clone());
    }

    let mean_required = |get: fn(&AdjustmentParameters) -> f32| -> f32 {
        samples.iter().map(get).sum::<f32>() / samples.len() as f32
    };

    let mean_required_i32 = |get: fn(&AdjustmentParameters) -> i32| -> i32 {
        (samples.iter().map(get).sum::<i32>() as f32 / samples.len() as f32).round() as i32
    };

    // Mean over the samples where the field is present; absent everywhere
    // stays absent.
    let mean_optional = |get: fn(&AdjustmentParameters) -> Option<f32>| -> Option<f32> {
        let present: Vec<f32> = samples.iter().filter_map(get).collect();
        if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f32>() / present.len() as f32)
        }
    };

    let mean_optional_i32 = |get: fn(&AdjustmentParameters) -> Option<i32>| -> Option<i32> {
        let present: Vec<i32> = samples.iter().filter_map(get).collect();
        if present.is_empty() {
            None
        } else {
            Some((present.iter().sum::<i32>() as f32 / present.len() as f32).round() as i32)
        }
    };

    // Majority vote among present values: true when at least half voted
    // true, otherwise absent. Absence of signal is not a negative signal.
    let majority = |get: fn(&AdjustmentParameters) -> Option<bool>| -> Option<bool> {
        let present: Vec<bool> = samples.iter().filter_map(get).collect();
        if present.is_empty() {
            return None;
        }
        let true_count = present.iter().filter(|v| **v).count();
        if true_count as f32 >= present.len() as f32 * 0.5 {
            Some(true)
        } else {
            None
        }
    };

    Ok(AdjustmentParameters {
        brightness: mean_required(|p| p.brightness),
        contrast: mean_required(|p| p.contrast),
        saturation: mean_required(|p| p.saturation),
        vibrance: mean_optional(|p| p.vibrance),
        hue: mean_required_i32(|p| p.hue),
        temperature: mean_required_i32(|p| p.temperature),
        tint: mean_required_i32(|p| p.tint),
        exposure: mean_optional(|p| p.exposure),

        sharpness: mean_required(|p| p.sharpness),
        clarity: mean_optional(|p| p.clarity),
        dehaze: mean_optional(|p| p.dehaze),
        grain: mean_optional(|p| p.grain),

        highlights: mean_optional_i32(|p| p.highlights),
        shadows: mean_optional_i32(|p| p.shadows),
        whites: mean_optional_i32(|p| p.whites),
        blacks: mean_optional_i32(|p| p.blacks),

        skin_smoothing: mean_optional(|p| p.skin_smoothing),
        blemish_removal: majority(|p| p.blemish_removal),
        eye_brightening: mean_optional(|p| p.eye_brightening),
        teeth_whitening: mean_optional(|p| p.teeth_whitening),
        face_slimming: mean_optional(|p| p.face_slimming),
        body_retouching: majority(|p| p.body_retouching),
        makeup_enhancement: majority(|p| p.makeup_enhancement),

        sky_enhancement: mean_optional(|p| p.sky_enhancement),
        foliage_enhancement: mean_optional(|p| p.foliage_enhancement),
        water_enhancement: mean_optional(|p| p.water_enhancement),
        landscape_clarity: mean_optional(|p| p.landscape_clarity),
        natural_saturation: mean_optional(|p| p.natural_saturation),
        dynamic_range: mean_optional(|p| p.dynamic_range),
        atmospheric_perspective: mean_optional(|p| p.atmospheric_perspective),

        selective_color_intensity: mean_optional(|p| p.selective_color_intensity),

        vignette: mean_optional(|p| p.vignette),
        denoise: mean_optional(|p| p.denoise),
        color_grading: most_common_grading(samples),
        filters: common_filters(samples),
    })
}

/// Filters appearing in at least half the samples, ties inclusive, in
/// first-encountered order.
fn common_filters(samples: &[AdjustmentParameters]) -> Vec<FilterKind> {
    let mut counts: Vec<(FilterKind, usize)> = Vec::new();
    for sample in samples {
        for filter in &sample.filters {
            match counts.iter_mut().find(|(f, _)| f == filter) {
                Some((_, n)) => *n += 1,
                None => counts.push((filter.clone(), 1)),
            }
        }
    }

    let threshold = samples.len() as f32 * 0.5;
    counts
        .into_iter()
        .filter(|(_, n)| *n as f32 >= threshold)
        .map(|(f, _)| f)
        .collect()
}

/// The most frequent grading preset among the samples where one is set;
/// ties break toward the first encountered.
fn most_common_grading(samples: &[AdjustmentParameters]) -> Option<ColorGrading> {
    let mut counts: Vec<(ColorGrading, usize)> = Vec::new();
    for sample in samples {
        if let Some(grading) = &sample.color_grading {
            match counts.iter_mut().find(|(g, _)| g == grading) {
                Some((_, n)) => *n += 1,
                None => counts.push((grading.clone(), 1)),
            }
        }
    }

    counts
        .into_iter()
        .max_by_key(|(_, n)| *n)
        .map(|(g, _)| g)
}

/// Overall confidence reported alongside a trained profile: how far the
/// aggregated style sits from "no edit at all". Clamped to 0.95 — heuristic
/// scores never claim certainty.
pub fn profile_confidence(params: &AdjustmentParameters) -> f32 {
    let deviations = [
        (params.brightness - 1.0).abs(),
        (params.contrast - 1.0).abs(),
        (params.saturation - 1.0).abs(),
        params.hue.abs() as f32 / 180.0,
        (params.sharpness - 1.0).abs() / 2.0,
        params.temperature.abs() as f32 / 100.0,
        params.tint.abs() as f32 / 100.0,
    ];
    let avg_deviation: f32 = deviations.iter().sum::<f32>() / deviations.len() as f32;
    (0.6 + avg_deviation * 0.7).min(0.95)
}
