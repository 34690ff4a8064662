use std::env;

/// Application-level constants
pub const APP_NAME: &str = "Retone";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "retone=info"
}

/// Base URL of the OpenAI-compatible vision endpoint used for style analysis.
pub fn analyzer_base_url() -> String {
    env::var("RETONE_ANALYZER_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string())
}

/// API key for the style analyzer. `None` means unauthenticated (local gateways).
pub fn analyzer_api_key() -> Option<String> {
    env::var("RETONE_ANALYZER_API_KEY")
        .or_else(|_| env::var("OPENAI_API_KEY"))
        .ok()
        .filter(|k| !k.trim().is_empty())
}

/// Vision model used to compare original/edited pairs.
pub fn analyzer_model() -> String {
    env::var("RETONE_ANALYZER_MODEL").unwrap_or_else(|_| "gpt-4o".to_string())
}

/// HTTP timeout for a single analyzer call, in seconds.
pub fn analyzer_timeout_secs() -> u64 {
    env::var("RETONE_ANALYZER_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(120)
}

/// TTL for cached profile parameters, in seconds.
pub fn cache_ttl_secs() -> u64 {
    env::var("RETONE_CACHE_TTL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3600)
}

/// Training images larger than this (either axis) are downscaled before
/// analysis so the analyzer payload stays bounded.
pub fn max_training_dimension() -> u32 {
    2560
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_retone() {
        assert_eq!(APP_NAME, "Retone");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn default_analyzer_model_is_vision_capable() {
        // Env may be set in CI; only assert the fallback when it is not.
        if env::var("RETONE_ANALYZER_MODEL").is_err() {
            assert_eq!(analyzer_model(), "gpt-4o");
        }
    }

    #[test]
    fn timeout_default_is_sane() {
        if env::var("RETONE_ANALYZER_TIMEOUT_SECS").is_err() {
            assert_eq!(analyzer_timeout_secs(), 120);
        }
    }

    #[test]
    fn training_dimension_bounded() {
        assert!(max_training_dimension() >= 1024);
    }
}
