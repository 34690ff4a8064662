//! Scene-conditional clamp ranges for scale-sensitive parameters.
//!
//! One table per scene type, hand-tuned. This is the single source of truth
//! for parameter bounds: the validator clamps against it and the adjustment
//! pipelines assume it already ran.

use super::image_type::ImageType;

/// Inclusive clamp range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Per-scene clamp ranges for the scale-sensitive parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicLimits {
    pub brightness: Range,
    pub contrast: Range,
    pub saturation: Range,
    pub sharpness: Range,
    pub dehaze: Range,
    pub clarity: Range,
    pub selective_color_intensity: Range,
}

/// Look up the clamp table for a scene type.
pub fn limits_for(image_type: ImageType) -> DynamicLimits {
    match image_type {
        // Night: brightness can rise a lot, but noise amplifiers stay tight
        ImageType::Night => DynamicLimits {
            brightness: Range::new(0.8, 1.8),
            contrast: Range::new(0.8, 1.4),
            saturation: Range::new(0.7, 1.4),
            sharpness: Range::new(0.5, 1.3),
            dehaze: Range::new(0.0, 0.5),
            clarity: Range::new(0.0, 1.0),
            selective_color_intensity: Range::new(0.0, 1.0),
        },

        // Low-key: keep the drama, be careful with brightness
        ImageType::LowKey => DynamicLimits {
            brightness: Range::new(0.7, 1.4),
            contrast: Range::new(0.8, 1.5),
            saturation: Range::new(0.7, 1.35),
            sharpness: Range::new(0.6, 1.6),
            dehaze: Range::new(0.0, 0.8),
            clarity: Range::new(0.0, 1.4),
            selective_color_intensity: Range::new(0.0, 1.1),
        },

        // High-key: allow darkening, preserve softness
        ImageType::HighKey => DynamicLimits {
            brightness: Range::new(0.6, 1.15),
            contrast: Range::new(0.7, 1.15),
            saturation: Range::new(0.7, 1.25),
            sharpness: Range::new(0.5, 1.3),
            dehaze: Range::new(0.0, 0.5),
            clarity: Range::new(0.0, 1.0),
            selective_color_intensity: Range::new(0.0, 0.9),
        },

        // Foggy: dehaze and clarity may go far to recover the scene
        ImageType::Foggy => DynamicLimits {
            brightness: Range::new(0.7, 1.3),
            contrast: Range::new(0.8, 1.4),
            saturation: Range::new(0.8, 1.5),
            sharpness: Range::new(0.6, 1.6),
            dehaze: Range::new(0.0, 2.0),
            clarity: Range::new(0.0, 1.6),
            selective_color_intensity: Range::new(0.0, 1.3),
        },

        // High-contrast: allow flattening
        ImageType::HighContrast => DynamicLimits {
            brightness: Range::new(0.7, 1.3),
            contrast: Range::new(0.6, 1.2),
            saturation: Range::new(0.7, 1.3),
            sharpness: Range::new(0.6, 1.5),
            dehaze: Range::new(0.0, 1.0),
            clarity: Range::new(0.0, 1.3),
            selective_color_intensity: Range::new(0.0, 1.2),
        },

        // Normal: the conservative baseline
        ImageType::Normal => DynamicLimits {
            brightness: Range::new(0.7, 1.35),
            contrast: Range::new(0.7, 1.25),
            saturation: Range::new(0.6, 1.35),
            sharpness: Range::new(0.5, 1.5),
            dehaze: Range::new(0.0, 1.0),
            clarity: Range::new(0.0, 1.3),
            selective_color_intensity: Range::new(0.0, 1.2),
        },
    }
}
