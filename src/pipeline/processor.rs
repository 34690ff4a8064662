//! Orchestrators for the two request flows.
//!
//! Training: image pairs → statistics → external analysis → validation →
//! aggregation → stored profile. Pairs are independent, so their analysis
//! runs concurrently; aggregation is the join point and a single failing
//! pair fails the whole request rather than being silently skipped.
//!
//! Correction: profile lookup (cache, then store) → adaptive pipeline →
//! encoded output. Cache failures never fail a request.
//!
//! Both orchestrators are pure pipeline logic with trait-based DI for the
//! analyzer; HTTP handling, uploads, and object storage belong to the
//! embedding service.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rusqlite::Connection;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::ParameterCache;
use crate::config;
use crate::db::{self, DatabaseError};
use crate::models::{AdjustmentParameters, CorrectionProfile};
use crate::pipeline::adjust::{
    apply_adaptive_correction, optimize_for_analysis, AdjustError, DecodedImage,
};
use crate::pipeline::analysis::{
    aggregate_parameters, analyze_image_stats, profile_confidence, validate_analysis,
    AnalysisError, StyleAnalyzer,
};

/// Profile names are user-facing labels, not documents.
pub const MAX_PROFILE_NAME_LEN: usize = 50;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Top-level error taxonomy for a request passing through the core.
///
/// The variants deliberately separate analyzer outages from codec failures
/// and both from bad input, so the embedding service can render a specific
/// message for each.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Image processing failed: {0}")]
    Adjust(#[from] AdjustError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

/// One original/edited example pair submitted for training.
#[derive(Debug, Clone)]
pub struct TrainingPair {
    pub original: Vec<u8>,
    pub edited: Vec<u8>,
}

impl TrainingPair {
    /// Zip separate original/edited lists into pairs, rejecting mismatched
    /// or empty submissions before any processing starts.
    pub fn pair_up(
        originals: Vec<Vec<u8>>,
        editeds: Vec<Vec<u8>>,
    ) -> Result<Vec<TrainingPair>, ProcessingError> {
        if originals.len() != editeds.len() {
            return Err(ProcessingError::InvalidInput(format!(
                "number of original ({}) and edited ({}) images must match",
                originals.len(),
                editeds.len()
            )));
        }
        if originals.is_empty() {
            return Err(ProcessingError::InvalidInput(
                "at least one image pair is required".to_string(),
            ));
        }
        Ok(originals
            .into_iter()
            .zip(editeds)
            .map(|(original, edited)| TrainingPair { original, edited })
            .collect())
    }
}

/// Per-pair validation outcome, reported alongside the trained profile so
/// callers can tell the user which pairs carried real signal.
#[derive(Debug, Clone)]
pub struct PairOutcome {
    pub confidence: f32,
    pub warnings: Vec<String>,
    pub used_defaults: bool,
}

/// Result of training without persistence.
#[derive(Debug, Clone)]
pub struct TrainedStyle {
    pub parameters: AdjustmentParameters,
    pub confidence: f32,
    pub pair_outcomes: Vec<PairOutcome>,
}

/// Result of training plus persistence.
#[derive(Debug, Clone)]
pub struct TrainedProfile {
    pub profile: CorrectionProfile,
    pub confidence: f32,
    pub pair_outcomes: Vec<PairOutcome>,
}

/// Drives the training flow against an injected analyzer.
pub struct StyleTrainer {
    analyzer: Arc<dyn StyleAnalyzer>,
}

impl StyleTrainer {
    pub fn new(analyzer: Arc<dyn StyleAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Analyze every pair concurrently, validate each estimate against its
    /// own original's statistics, and aggregate into one style.
    pub fn train(&self, pairs: &[TrainingPair]) -> Result<TrainedStyle, ProcessingError> {
        if pairs.is_empty() {
            return Err(ProcessingError::InvalidInput(
                "at least one image pair is required".to_string(),
            ));
        }

        let start = Instant::now();

        // Join point: collect() stops at the first pair error — a failing
        // pair fails the aggregation, never silently drops out.
        let results: Result<Vec<_>, ProcessingError> = pairs
            .par_iter()
            .enumerate()
            .map(|(index, pair)| self.analyze_pair(index, pair))
            .collect();
        let results = results?;

        let (validated, pair_outcomes): (Vec<_>, Vec<_>) = results.into_iter().unzip();

        let parameters = aggregate_parameters(&validated)?;
        let confidence = profile_confidence(&parameters);

        info!(
            pair_count = pairs.len(),
            confidence = format!("{confidence:.2}"),
            elapsed_ms = %start.elapsed().as_millis(),
            "Training complete"
        );

        Ok(TrainedStyle {
            parameters,
            confidence,
            pair_outcomes,
        })
    }

    /// Train and persist under a validated profile name; the cache is warmed
    /// best-effort for the correction path.
    pub fn train_and_store(
        &self,
        conn: &Connection,
        cache: &ParameterCache,
        name: &str,
        pairs: &[TrainingPair],
    ) -> Result<TrainedProfile, ProcessingError> {
        let name = name.trim();
        if name.is_empty() || name.len() > MAX_PROFILE_NAME_LEN {
            return Err(ProcessingError::InvalidInput(format!(
                "profile name must be 1-{MAX_PROFILE_NAME_LEN} characters"
            )));
        }

        let style = self.train(pairs)?;

        let profile = CorrectionProfile::new(name, style.parameters);
        db::insert_profile(conn, &profile)?;
        cache.set(&cache_key(profile.id), profile.parameters.clone());

        info!(profile_id = %profile.id, name, "Profile stored");

        Ok(TrainedProfile {
            profile,
            confidence: style.confidence,
            pair_outcomes: style.pair_outcomes,
        })
    }

    fn analyze_pair(
        &self,
        index: usize,
        pair: &TrainingPair,
    ) -> Result<(AdjustmentParameters, PairOutcome), ProcessingError> {
        let max_dim = config::max_training_dimension();
        let original = optimize_for_analysis(&pair.original, max_dim)?;
        let edited = optimize_for_analysis(&pair.edited, max_dim)?;

        // Statistics come from the pair's *original* image: validation asks
        // whether the claimed edit makes sense for that starting point.
        let decoded = DecodedImage::from_bytes(&original)?;
        let stats = analyze_image_stats(&decoded)?;

        let raw = self.analyzer.analyze_pair(&original, &edited)?;
        let validation = validate_analysis(&raw, &stats);

        if validation.use_defaults {
            warn!(
                pair = index,
                reason = validation.reason.as_deref().unwrap_or(""),
                "Pair estimate rejected - conservative defaults used"
            );
        }

        Ok((
            validation.params,
            PairOutcome {
                confidence: validation.confidence,
                warnings: validation.warnings,
                used_defaults: validation.use_defaults,
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// Correction
// ---------------------------------------------------------------------------

/// Result of applying a profile to one photo.
#[derive(Debug, Clone)]
pub struct CorrectionOutcome {
    pub bytes: Vec<u8>,
    /// Parameters actually applied, after target-aware adaptation.
    pub applied: AdjustmentParameters,
    pub cache_hit: bool,
    pub processing_ms: u128,
}

/// Drives the correction flow: parameter lookup plus adaptive application.
pub struct CorrectionProcessor<'a> {
    conn: &'a Connection,
    cache: &'a ParameterCache,
}

impl<'a> CorrectionProcessor<'a> {
    pub fn new(conn: &'a Connection, cache: &'a ParameterCache) -> Self {
        Self { conn, cache }
    }

    pub fn apply(
        &self,
        profile_id: Uuid,
        image: &[u8],
    ) -> Result<CorrectionOutcome, ProcessingError> {
        let start = Instant::now();
        let key = cache_key(profile_id);

        let (parameters, cache_hit) = match self.cache.get(&key) {
            Some(parameters) => (parameters, true),
            None => {
                let profile = db::get_profile(self.conn, &profile_id)?.ok_or_else(|| {
                    DatabaseError::NotFound {
                        entity_type: "correction_profile".to_string(),
                        id: profile_id.to_string(),
                    }
                })?;
                self.cache.set(&key, profile.parameters.clone());
                (profile.parameters, false)
            }
        };

        let decoded = DecodedImage::from_bytes(image)?;
        let outcome = apply_adaptive_correction(decoded, &parameters)?;

        let processing_ms = start.elapsed().as_millis();
        info!(
            profile_id = %profile_id,
            cache_hit,
            processing_ms = %processing_ms,
            "Correction applied"
        );

        Ok(CorrectionOutcome {
            bytes: outcome.bytes,
            applied: outcome.applied,
            cache_hit,
            processing_ms,
        })
    }
}

fn cache_key(profile_id: Uuid) -> String {
    format!("profile:{profile_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::pipeline::adjust::encode_png;
    use crate::pipeline::analysis::{MockStyleAnalyzer, RawAdjustments};
    use image::{Rgba, RgbaImage};
    use std::time::Duration;

    fn png_bytes(v: u8) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(12, 12, Rgba([v, v, v, 255]))).unwrap()
    }

    fn pairs(n: usize) -> Vec<TrainingPair> {
        (0..n)
            .map(|_| TrainingPair {
                original: png_bytes(120),
                edited: png_bytes(150),
            })
            .collect()
    }

    fn trainer_with(raw: RawAdjustments) -> StyleTrainer {
        StyleTrainer::new(Arc::new(MockStyleAnalyzer::returning(raw)))
    }

    fn confident_raw() -> RawAdjustments {
        RawAdjustments {
            brightness: Some(1.2),
            contrast: Some(1.1),
            saturation: Some(1.1),
            sharpness: Some(1.1),
            ..Default::default()
        }
    }

    // ── Input validation ────────────────────────────────────────────

    #[test]
    fn pair_up_rejects_mismatched_counts() {
        let err = TrainingPair::pair_up(vec![png_bytes(1)], vec![]).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidInput(_)));
    }

    #[test]
    fn pair_up_rejects_empty_submission() {
        let err = TrainingPair::pair_up(vec![], vec![]).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidInput(_)));
    }

    #[test]
    fn training_rejects_empty_pairs() {
        let trainer = trainer_with(confident_raw());
        assert!(matches!(
            trainer.train(&[]),
            Err(ProcessingError::InvalidInput(_))
        ));
    }

    #[test]
    fn profile_name_is_validated_before_any_analysis() {
        let conn = open_memory_database().unwrap();
        let cache = ParameterCache::new(Duration::from_secs(60));
        // A failing analyzer proves the name check happens first.
        let trainer = StyleTrainer::new(Arc::new(MockStyleAnalyzer::failing_with_quota()));

        let long_name = "x".repeat(51);
        let err = trainer
            .train_and_store(&conn, &cache, &long_name, &pairs(1))
            .unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidInput(_)));

        let err = trainer
            .train_and_store(&conn, &cache, "   ", &pairs(1))
            .unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidInput(_)));
    }

    // ── Training flow ───────────────────────────────────────────────

    #[test]
    fn training_aggregates_across_pairs() {
        let trainer = trainer_with(confident_raw());
        let style = trainer.train(&pairs(3)).unwrap();

        assert_eq!(style.pair_outcomes.len(), 3);
        assert!(style.pair_outcomes.iter().all(|o| !o.used_defaults));
        assert!((style.parameters.brightness - 1.2).abs() < 1e-6);
        assert!(style.confidence >= 0.6);
    }

    #[test]
    fn analyzer_outage_fails_training_not_defaults() {
        let trainer = StyleTrainer::new(Arc::new(MockStyleAnalyzer::failing_with_quota()));
        let err = trainer.train(&pairs(2)).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::Analysis(AnalysisError::QuotaExceeded)
        ));
    }

    #[test]
    fn empty_analyzer_response_fails_training() {
        let trainer =
            StyleTrainer::new(Arc::new(MockStyleAnalyzer::failing_with_empty_response()));
        let err = trainer.train(&pairs(1)).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::Analysis(AnalysisError::EmptyResponse)
        ));
    }

    #[test]
    fn corrupt_image_pair_fails_training() {
        let trainer = trainer_with(confident_raw());
        let bad_pairs = vec![TrainingPair {
            original: b"not an image".to_vec(),
            edited: png_bytes(100),
        }];
        let err = trainer.train(&bad_pairs).unwrap_err();
        assert!(matches!(err, ProcessingError::Adjust(_)));
    }

    #[test]
    fn identical_pair_scenario_yields_conservative_defaults() {
        // The analyzer sees no difference and reports pure neutral values;
        // the validator treats that as a suspicious null result.
        let neutral = RawAdjustments {
            brightness: Some(1.0),
            contrast: Some(1.0),
            saturation: Some(1.0),
            sharpness: Some(1.0),
            hue: Some(0.0),
            temperature: Some(0.0),
            ..Default::default()
        };
        let trainer = trainer_with(neutral);
        let style = trainer.train(&pairs(1)).unwrap();

        assert!(style.pair_outcomes[0].used_defaults);
        assert_eq!(style.parameters.contrast, 1.05);
        assert_eq!(style.parameters.sharpness, 1.1);
        assert_eq!(style.parameters.vibrance, Some(1.05));
    }

    #[test]
    fn train_and_store_persists_and_warms_cache() {
        let conn = open_memory_database().unwrap();
        let cache = ParameterCache::new(Duration::from_secs(60));
        let trainer = trainer_with(confident_raw());

        let trained = trainer
            .train_and_store(&conn, &cache, "Beach preset", &pairs(2))
            .unwrap();

        let stored = db::get_profile(&conn, &trained.profile.id).unwrap().unwrap();
        assert_eq!(stored.name, "Beach preset");
        assert_eq!(stored.parameters, trained.profile.parameters);

        // Cache warmed with the same parameters.
        let cached = cache.get(&cache_key(trained.profile.id)).unwrap();
        assert_eq!(cached, trained.profile.parameters);
    }

    // ── Correction flow ─────────────────────────────────────────────

    fn stored_profile(conn: &Connection, brightness: f32) -> CorrectionProfile {
        let mut parameters = AdjustmentParameters::neutral();
        parameters.brightness = brightness;
        let profile = CorrectionProfile::new("stored", parameters);
        db::insert_profile(conn, &profile).unwrap();
        profile
    }

    #[test]
    fn correction_falls_back_to_store_then_caches() {
        let conn = open_memory_database().unwrap();
        let cache = ParameterCache::new(Duration::from_secs(60));
        let profile = stored_profile(&conn, 1.2);
        let processor = CorrectionProcessor::new(&conn, &cache);

        let first = processor.apply(profile.id, &png_bytes(120)).unwrap();
        assert!(!first.cache_hit);
        assert!(!first.bytes.is_empty());

        let second = processor.apply(profile.id, &png_bytes(120)).unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.applied.brightness, 1.2);
    }

    #[test]
    fn correction_for_unknown_profile_is_not_found() {
        let conn = open_memory_database().unwrap();
        let cache = ParameterCache::new(Duration::from_secs(60));
        let processor = CorrectionProcessor::new(&conn, &cache);

        let err = processor.apply(Uuid::new_v4(), &png_bytes(120)).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::Database(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn correction_rejects_corrupt_image() {
        let conn = open_memory_database().unwrap();
        let cache = ParameterCache::new(Duration::from_secs(60));
        let profile = stored_profile(&conn, 1.1);
        let processor = CorrectionProcessor::new(&conn, &cache);

        let err = processor.apply(profile.id, b"garbage").unwrap_err();
        assert!(matches!(err, ProcessingError::Adjust(_)));
    }

    #[test]
    fn expired_cache_entry_transparently_reloads() {
        let conn = open_memory_database().unwrap();
        let cache = ParameterCache::new(Duration::from_millis(0));
        let profile = stored_profile(&conn, 1.15);
        let processor = CorrectionProcessor::new(&conn, &cache);

        // Every call expires immediately; the store keeps answering.
        let outcome = processor.apply(profile.id, &png_bytes(120)).unwrap();
        assert!(!outcome.cache_hit);
        let outcome = processor.apply(profile.id, &png_bytes(120)).unwrap();
        assert!(!outcome.cache_hit);
        assert_eq!(outcome.applied.brightness, 1.15);
    }
}
