//! moodlens-core — expression detection over ONNX Runtime.
//!
//! A single-shot locator finds the dominant face in a grayscale frame and a
//! five-class expression net scores it. [`ExpressionPipeline`] is the only
//! surface the application layer consumes.

pub mod expression;
pub mod face;
pub mod pipeline;
mod raster;
pub mod types;

pub use pipeline::{ExpressionPipeline, PipelineError};
pub use types::{EmotionLabel, ExpressionScores};

use std::path::PathBuf;

/// Default model directory: `$XDG_DATA_HOME/moodlens/models` with the usual
/// `~/.local/share` fallback.
pub fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("moodlens")
        .join("models")
}
