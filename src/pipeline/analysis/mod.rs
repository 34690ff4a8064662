pub mod aggregate;
pub mod image_type;
pub mod limits;
pub mod prompt;
pub mod raw;
pub mod stats;
pub mod validate;
pub mod vision;

pub use aggregate::*;
pub use image_type::*;
pub use limits::*;
pub use raw::*;
pub use stats::*;
pub use validate::*;
pub use vision::*;

use thiserror::Error;

/// Errors from the style-analysis side of the pipeline.
///
/// Analyzer transport failures are deliberately distinct variants: a dead or
/// rate-limited analyzer must surface as an error, never be papered over with
/// conservative defaults (those exist only for low-confidence *validated*
/// responses).
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("style analyzer is not reachable at {0}")]
    Connection(String),

    #[error("style analyzer request timed out after {0}s")]
    Timeout(u64),

    #[error("style analyzer quota exceeded")]
    QuotaExceeded,

    #[error("style analyzer returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("style analyzer returned empty content")]
    EmptyResponse,

    #[error("failed to parse analyzer response: {0}")]
    ResponseParsing(String),

    #[error("image has no pixels to analyze")]
    EmptyImage,

    #[error("no validated samples to aggregate")]
    NoSamples,
}
