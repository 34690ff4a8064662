pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

pub use models::{AdjustmentParameters, ColorGrading, CorrectionProfile, FilterKind};
pub use pipeline::adjust::{
    apply_adaptive_correction, apply_adjustments, apply_landscape_enhancement, AdjustError,
    DecodedImage,
};
pub use pipeline::analysis::{
    aggregate_parameters, analyze_image_stats, detect_image_type, limits_for, profile_confidence,
    validate_analysis, AnalysisError, DynamicLimits, ImageStatistics, ImageType, RawAdjustments,
    StyleAnalyzer, ValidationResult,
};
pub use pipeline::processor::{
    CorrectionOutcome, CorrectionProcessor, PairOutcome, ProcessingError, StyleTrainer,
    TrainedProfile, TrainedStyle, TrainingPair,
};

/// Initialize tracing for binaries embedding the retone core.
///
/// Respects `RUST_LOG` when set, otherwise falls back to the crate default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Retone core v{}", config::APP_VERSION);
}
