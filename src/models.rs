//! Core data models shared across the analysis and adjustment pipelines.
//!
//! `AdjustmentParameters` is the contract that crosses every boundary in the
//! system: analyzer output is validated into it, profiles persist it, and
//! both adjustment pipelines consume it. Its JSON shape must stay symmetric
//! (serialize/deserialize round-trip safe) because stored profiles outlive
//! code revisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The full vocabulary of adjustments describing a photo-editing style.
///
/// Core fields (`brightness`, `contrast`, `saturation`, `sharpness`, `hue`,
/// `temperature`, `tint`, `filters`) are always present; everything else is
/// optional and absent unless the analyzer detected that kind of edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentParameters {
    // Basic color adjustments
    #[serde(default = "default_one")]
    pub brightness: f32,
    #[serde(default = "default_one")]
    pub contrast: f32,
    #[serde(default = "default_one")]
    pub saturation: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrance: Option<f32>,
    #[serde(default)]
    pub hue: i32,
    #[serde(default)]
    pub temperature: i32,
    #[serde(default)]
    pub tint: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<f32>,

    // Detail & sharpness
    #[serde(default = "default_one")]
    pub sharpness: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dehaze: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grain: Option<f32>,

    // Tone curve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadows: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whites: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blacks: Option<i32>,

    // Portrait retouching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin_smoothing: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blemish_removal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_brightening: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teeth_whitening: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_slimming: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_retouching: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub makeup_enhancement: Option<bool>,

    // Landscape fields. The sky/foliage/water/naturalSaturation/dynamicRange/
    // atmosphericPerspective group is deprecated (the analyzer prompt forces
    // them to 0) but kept for JSON compatibility with stored profiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sky_enhancement: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foliage_enhancement: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_enhancement: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landscape_clarity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_saturation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_range: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmospheric_perspective: Option<f32>,

    // Selective color (HSL band) enhancement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective_color_intensity: Option<f32>,

    // Effects & filters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vignette: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denoise: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_grading: Option<ColorGrading>,
    #[serde(default)]
    pub filters: Vec<FilterKind>,
}

fn default_one() -> f32 {
    1.0
}

impl Default for AdjustmentParameters {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            vibrance: None,
            hue: 0,
            temperature: 0,
            tint: 0,
            exposure: None,
            sharpness: 1.0,
            clarity: None,
            dehaze: None,
            grain: None,
            highlights: None,
            shadows: None,
            whites: None,
            blacks: None,
            skin_smoothing: None,
            blemish_removal: None,
            eye_brightening: None,
            teeth_whitening: None,
            face_slimming: None,
            body_retouching: None,
            makeup_enhancement: None,
            sky_enhancement: None,
            foliage_enhancement: None,
            water_enhancement: None,
            landscape_clarity: None,
            natural_saturation: None,
            dynamic_range: None,
            atmospheric_perspective: None,
            selective_color_intensity: None,
            vignette: None,
            denoise: None,
            color_grading: None,
            filters: Vec::new(),
        }
    }
}

impl AdjustmentParameters {
    /// A parameter set that changes nothing when applied.
    pub fn neutral() -> Self {
        Self::default()
    }
}

/// Named color-grading preset.
///
/// Stored profiles may carry grading names from newer builds; those are kept
/// as `Unknown` and applied as a no-op with a logged warning rather than
/// failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColorGrading {
    WarmVintage,
    CoolModern,
    Cinematic,
    /// Explicit "no grading" wire value.
    None,
    Unknown(String),
}

impl From<String> for ColorGrading {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "warm_vintage" => ColorGrading::WarmVintage,
            "cool_modern" => ColorGrading::CoolModern,
            "cinematic" => ColorGrading::Cinematic,
            "none" => ColorGrading::None,
            _ => ColorGrading::Unknown(s),
        }
    }
}

impl From<ColorGrading> for String {
    fn from(g: ColorGrading) -> Self {
        match g {
            ColorGrading::WarmVintage => "warm_vintage".to_string(),
            ColorGrading::CoolModern => "cool_modern".to_string(),
            ColorGrading::Cinematic => "cinematic".to_string(),
            ColorGrading::None => "none".to_string(),
            ColorGrading::Unknown(s) => s,
        }
    }
}

/// Post-pipeline filter effect.
///
/// `blur` and `soft_focus` are wire aliases for the same effect; the
/// canonical serialized form is `soft_focus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterKind {
    Denoise,
    SoftFocus,
    SkinSmoothing,
    Hdr,
    Glow,
    Vignette,
    Unknown(String),
}

impl From<String> for FilterKind {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "denoise" => FilterKind::Denoise,
            "soft_focus" | "blur" => FilterKind::SoftFocus,
            "skin_smoothing" => FilterKind::SkinSmoothing,
            "hdr" => FilterKind::Hdr,
            "glow" => FilterKind::Glow,
            "vignette" => FilterKind::Vignette,
            _ => FilterKind::Unknown(s),
        }
    }
}

impl From<FilterKind> for String {
    fn from(f: FilterKind) -> Self {
        match f {
            FilterKind::Denoise => "denoise".to_string(),
            FilterKind::SoftFocus => "soft_focus".to_string(),
            FilterKind::SkinSmoothing => "skin_smoothing".to_string(),
            FilterKind::Hdr => "hdr".to_string(),
            FilterKind::Glow => "glow".to_string(),
            FilterKind::Vignette => "vignette".to_string(),
            FilterKind::Unknown(s) => s,
        }
    }
}

/// A stored correction profile: one aggregated parameter set plus identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionProfile {
    pub id: Uuid,
    pub name: String,
    pub parameters: AdjustmentParameters,
    pub created_at: DateTime<Utc>,
}

impl CorrectionProfile {
    pub fn new(name: &str, parameters: AdjustmentParameters) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            parameters,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_parameters_have_no_effects() {
        let p = AdjustmentParameters::neutral();
        assert_eq!(p.brightness, 1.0);
        assert_eq!(p.contrast, 1.0);
        assert_eq!(p.saturation, 1.0);
        assert_eq!(p.sharpness, 1.0);
        assert_eq!(p.hue, 0);
        assert!(p.vibrance.is_none());
        assert!(p.filters.is_empty());
    }

    #[test]
    fn parameters_round_trip_through_json() {
        let mut p = AdjustmentParameters::neutral();
        p.brightness = 1.2;
        p.vibrance = Some(1.1);
        p.skin_smoothing = Some(0.4);
        p.selective_color_intensity = Some(0.8);
        p.color_grading = Some(ColorGrading::Cinematic);
        p.filters = vec![FilterKind::Hdr, FilterKind::Glow];

        let json = serde_json::to_string(&p).unwrap();
        let back: AdjustmentParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn wire_shape_uses_camel_case_names() {
        let mut p = AdjustmentParameters::neutral();
        p.skin_smoothing = Some(0.3);
        p.selective_color_intensity = Some(1.0);

        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"skinSmoothing\""));
        assert!(json.contains("\"selectiveColorIntensity\""));
        assert!(!json.contains("skin_smoothing"));
    }

    #[test]
    fn absent_optionals_stay_absent() {
        let p = AdjustmentParameters::neutral();
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("vibrance"));
        assert!(!json.contains("skyEnhancement"));

        // Sparse stored profiles must still deserialize.
        let sparse: AdjustmentParameters =
            serde_json::from_str(r#"{"brightness":1.1,"filters":[]}"#).unwrap();
        assert_eq!(sparse.brightness, 1.1);
        assert_eq!(sparse.contrast, 1.0);
        assert!(sparse.clarity.is_none());
    }

    #[test]
    fn unknown_filter_survives_round_trip() {
        let raw = r#"{"filters":["hdr","blur","bokeh"]}"#;
        let p: AdjustmentParameters = serde_json::from_str(raw).unwrap();
        assert_eq!(p.filters[0], FilterKind::Hdr);
        assert_eq!(p.filters[1], FilterKind::SoftFocus);
        assert_eq!(p.filters[2], FilterKind::Unknown("bokeh".to_string()));

        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("bokeh"));
    }

    #[test]
    fn color_grading_parses_known_and_unknown() {
        assert_eq!(
            ColorGrading::from("warm_vintage".to_string()),
            ColorGrading::WarmVintage
        );
        assert_eq!(ColorGrading::from("none".to_string()), ColorGrading::None);
        assert_eq!(
            ColorGrading::from("teal_orange".to_string()),
            ColorGrading::Unknown("teal_orange".to_string())
        );
    }
}
