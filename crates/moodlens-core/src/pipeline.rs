//! The two-model expression pipeline — the detector boundary the
//! application layer consumes.

use crate::expression::{ExpressionError, ExpressionNet};
use crate::face::{FaceLocator, LocatorError};
use crate::types::ExpressionScores;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("face locator: {0}")]
    Locator(#[from] LocatorError),
    #[error("expression net: {0}")]
    Expression(#[from] ExpressionError),
}

/// Face locator + expression net behind the two operations the rest of the
/// system depends on: load a model set, score one frame.
pub struct ExpressionPipeline {
    locator: FaceLocator,
    net: ExpressionNet,
}

impl ExpressionPipeline {
    /// Load both models fail-fast. A missing or unreadable file surfaces
    /// before any camera work starts.
    pub fn load(
        face_model: &str,
        expression_model: &str,
        face_threshold: f32,
    ) -> Result<Self, PipelineError> {
        let locator = FaceLocator::load(face_model, face_threshold)?;
        let net = ExpressionNet::load(expression_model)?;
        Ok(Self { locator, net })
    }

    /// Score the dominant face in a grayscale frame.
    ///
    /// `Ok(None)` when no face clears the locator threshold — the caller
    /// treats that tick as a no-op.
    pub fn classify(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Option<ExpressionScores>, PipelineError> {
        let Some(face) = self.locator.locate(frame, width, height)? else {
            return Ok(None);
        };
        tracing::trace!(confidence = face.confidence, "face located");

        let scores = self.net.score(frame, width, height, &face)?;
        Ok(Some(scores))
    }
}
