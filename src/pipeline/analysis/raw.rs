//! Untrusted analyzer output.
//!
//! The style analyzer returns best-effort JSON: fields may be missing, extra,
//! mistyped, or wildly out of range. `RawAdjustments` models that honestly —
//! every field optional, parsed leniently (a mistyped field becomes absent,
//! never an error) — and nothing downstream may treat it as a domain value
//! until it has passed through the validator.

use serde_json::Value;

use super::AnalysisError;

/// Raw, unvalidated parameter estimate as returned by the analyzer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAdjustments {
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    pub vibrance: Option<f32>,
    pub hue: Option<f32>,
    pub temperature: Option<f32>,
    pub tint: Option<f32>,
    pub exposure: Option<f32>,

    pub sharpness: Option<f32>,
    pub clarity: Option<f32>,
    pub dehaze: Option<f32>,
    pub grain: Option<f32>,

    pub highlights: Option<f32>,
    pub shadows: Option<f32>,
    pub whites: Option<f32>,
    pub blacks: Option<f32>,

    pub skin_smoothing: Option<f32>,
    pub blemish_removal: Option<bool>,
    pub eye_brightening: Option<f32>,
    pub teeth_whitening: Option<f32>,
    pub face_slimming: Option<f32>,
    pub body_retouching: Option<bool>,
    pub makeup_enhancement: Option<bool>,

    pub sky_enhancement: Option<f32>,
    pub foliage_enhancement: Option<f32>,
    pub water_enhancement: Option<f32>,
    pub landscape_clarity: Option<f32>,
    pub natural_saturation: Option<f32>,
    pub dynamic_range: Option<f32>,
    pub atmospheric_perspective: Option<f32>,

    pub selective_color_intensity: Option<f32>,

    pub vignette: Option<f32>,
    pub denoise: Option<f32>,
    pub color_grading: Option<String>,
    pub filters: Vec<String>,
}

impl RawAdjustments {
    /// Parse the analyzer's response text. The text must be a JSON object;
    /// inside it, anything goes — wrong-typed fields are dropped.
    pub fn from_response_text(text: &str) -> Result<Self, AnalysisError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;
        if !value.is_object() {
            return Err(AnalysisError::ResponseParsing(
                "response is not a JSON object".to_string(),
            ));
        }
        Ok(Self::from_value(&value))
    }

    /// Lenient field-by-field extraction from a JSON object.
    pub fn from_value(value: &Value) -> Self {
        Self {
            brightness: num(value, "brightness"),
            contrast: num(value, "contrast"),
            saturation: num(value, "saturation"),
            vibrance: num(value, "vibrance"),
            hue: num(value, "hue"),
            temperature: num(value, "temperature"),
            tint: num(value, "tint"),
            exposure: num(value, "exposure"),
            sharpness: num(value, "sharpness"),
            clarity: num(value, "clarity"),
            dehaze: num(value, "dehaze"),
            grain: num(value, "grain"),
            highlights: num(value, "highlights"),
            shadows: num(value, "shadows"),
            whites: num(value, "whites"),
            blacks: num(value, "blacks"),
            skin_smoothing: num(value, "skinSmoothing"),
            blemish_removal: boolean(value, "blemishRemoval"),
            eye_brightening: num(value, "eyeBrightening"),
            teeth_whitening: num(value, "teethWhitening"),
            face_slimming: num(value, "faceSlimming"),
            body_retouching: boolean(value, "bodyRetouching"),
            makeup_enhancement: boolean(value, "makeupEnhancement"),
            sky_enhancement: num(value, "skyEnhancement"),
            foliage_enhancement: num(value, "foliageEnhancement"),
            water_enhancement: num(value, "waterEnhancement"),
            landscape_clarity: num(value, "landscapeClarity"),
            natural_saturation: num(value, "naturalSaturation"),
            dynamic_range: num(value, "dynamicRange"),
            atmospheric_perspective: num(value, "atmosphericPerspective"),
            selective_color_intensity: num(value, "selectiveColorIntensity"),
            vignette: num(value, "vignette"),
            denoise: num(value, "denoise"),
            color_grading: string(value, "colorGrading"),
            filters: string_list(value, "filters"),
        }
    }
}

fn num(value: &Value, key: &str) -> Option<f32> {
    value.get(key).and_then(Value::as_f64).map(|v| v as f32)
}

fn boolean(value: &Value, key: &str) -> Option<bool> {
    value.get(key).and_then(Value::as_bool)
}

fn string(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

/// Extract an array of strings, skipping non-string items.
fn string_list(value: &Value, key: &str) -> Vec<String> {
    match value.get(key).and_then(Value::as_array) {
        None => Vec::new(),
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_response() {
        let raw = RawAdjustments::from_response_text(
            r#"{
                "brightness": 1.2,
                "contrast": 1.1,
                "saturation": 1.15,
                "hue": 5,
                "sharpness": 1.1,
                "skinSmoothing": 0.4,
                "blemishRemoval": true,
                "colorGrading": "cinematic",
                "filters": ["hdr", "glow"]
            }"#,
        )
        .unwrap();

        assert_eq!(raw.brightness, Some(1.2));
        assert_eq!(raw.hue, Some(5.0));
        assert_eq!(raw.skin_smoothing, Some(0.4));
        assert_eq!(raw.blemish_removal, Some(true));
        assert_eq!(raw.color_grading.as_deref(), Some("cinematic"));
        assert_eq!(raw.filters, vec!["hdr", "glow"]);
    }

    #[test]
    fn mistyped_fields_become_absent() {
        let raw = RawAdjustments::from_response_text(
            r#"{
                "brightness": "very bright",
                "contrast": 1.1,
                "blemishRemoval": "yes",
                "filters": ["hdr", 42, null, "glow"]
            }"#,
        )
        .unwrap();

        assert_eq!(raw.brightness, None);
        assert_eq!(raw.contrast, Some(1.1));
        assert_eq!(raw.blemish_removal, None);
        assert_eq!(raw.filters, vec!["hdr", "glow"]);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let raw = RawAdjustments::from_response_text(
            r#"{"brightness": 1.0, "analysis_notes": "looks warmer", "nested": {"a": 1}}"#,
        )
        .unwrap();
        assert_eq!(raw.brightness, Some(1.0));
    }

    #[test]
    fn empty_object_is_all_absent() {
        let raw = RawAdjustments::from_response_text("{}").unwrap();
        assert_eq!(raw, RawAdjustments::default());
    }

    #[test]
    fn non_object_response_is_an_error() {
        assert!(matches!(
            RawAdjustments::from_response_text("[1,2,3]"),
            Err(AnalysisError::ResponseParsing(_))
        ));
        assert!(matches!(
            RawAdjustments::from_response_text("not json"),
            Err(AnalysisError::ResponseParsing(_))
        ));
    }
}
