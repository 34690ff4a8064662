//! Scene classification from image statistics.
//!
//! An image can satisfy several rules at once (a night shot can also have a
//! high dynamic range); the fixed evaluation order resolves ties toward the
//! more extreme classification. Do not reorder.

use serde::{Deserialize, Serialize};

use super::stats::ImageStatistics;

/// Coarse tonal character of an image, driving how aggressively parameters
/// may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    Normal,
    Night,
    LowKey,
    HighKey,
    Foggy,
    HighContrast,
}

impl ImageType {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageType::Normal => "normal",
            ImageType::Night => "night",
            ImageType::LowKey => "low_key",
            ImageType::HighKey => "high_key",
            ImageType::Foggy => "foggy",
            ImageType::HighContrast => "high_contrast",
        }
    }
}

impl std::fmt::Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an image from its statistics. Pure and deterministic: the same
/// statistics always produce the same type.
pub fn detect_image_type(stats: &ImageStatistics) -> ImageType {
    // 1. Night: dark with dominant shadows
    if stats.avg_brightness < 60.0 && stats.histogram.shadows > 0.6 {
        return ImageType::Night;
    }

    // 2. Low-key: dark but contrasty
    if stats.avg_brightness < 90.0 && stats.dynamic_range > 40.0 && stats.histogram.shadows > 0.5 {
        return ImageType::LowKey;
    }

    // 3. High-key: bright and soft
    if stats.avg_brightness > 180.0
        && stats.histogram.highlights > 0.6
        && stats.dynamic_range < 35.0
    {
        return ImageType::HighKey;
    }

    // 4. Foggy: mid-brightness, washed out, flat
    if stats.avg_saturation < 0.25
        && stats.dynamic_range < 30.0
        && stats.avg_brightness > 100.0
        && stats.avg_brightness < 200.0
    {
        return ImageType::Foggy;
    }

    // 5. High-contrast: wide dynamic range
    if stats.dynamic_range > 60.0 {
        return ImageType::HighContrast;
    }

    ImageType::Normal
}
