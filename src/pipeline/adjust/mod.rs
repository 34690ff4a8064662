pub mod adaptive;
pub mod buffer;
pub mod color;
pub mod ops;
pub mod selective;
pub mod standard;

pub use adaptive::*;
pub use buffer::*;
pub use selective::*;
pub use standard::*;

use thiserror::Error;

/// Errors from the image-adjustment side of the pipeline.
///
/// Codec failures are kept distinct from analyzer failures so callers can
/// render "your image is corrupt" rather than "analysis failed".
#[derive(Error, Debug)]
pub enum AdjustError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("image has zero dimensions")]
    EmptyImage,
}
