//! Five-class expression scorer via ONNX Runtime.
//!
//! Takes the face box from the locator, crops a margined square around it,
//! and feeds a 64×64 single-channel tensor to a compact classifier head.
//! Logits come back in [`EmotionLabel::ALL`] order and are softmaxed into
//! confidence scores.

use crate::face::FaceBox;
use crate::raster;
use crate::types::{EmotionLabel, ExpressionScores};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const EXPR_INPUT_SIZE: usize = 64;
const EXPR_MEAN: f32 = 127.5;
const EXPR_STD: f32 = 127.5; // symmetric normalization, input lands in [-1, 1]
/// Extra context around the face box before cropping, as a fraction of the
/// longer box side.
const CROP_MARGIN: f32 = 0.25;

#[derive(Error, Debug)]
pub enum ExpressionError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Expression classifier head.
pub struct ExpressionNet {
    session: Session,
}

impl ExpressionNet {
    /// Load the expression ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, ExpressionError> {
        if !Path::new(model_path).exists() {
            return Err(ExpressionError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = model_path,
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded expression model"
        );

        Ok(Self { session })
    }

    /// Score the expression of one located face in a grayscale frame.
    pub fn score(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
        face: &FaceBox,
    ) -> Result<ExpressionScores, ExpressionError> {
        let input = crop_tensor(frame, width as usize, height as usize, face);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ExpressionError::InferenceFailed(format!("logits: {e}")))?;

        if logits.len() != EmotionLabel::ALL.len() {
            return Err(ExpressionError::InferenceFailed(format!(
                "expected {} logits, got {}",
                EmotionLabel::ALL.len(),
                logits.len()
            )));
        }

        Ok(ExpressionScores::from_model_order(&softmax(logits)))
    }
}

/// Crop a margined square around the face, scale it to the model input,
/// and normalize into a single-channel NCHW tensor.
///
/// The square may extend past the frame; the crop fills the overhang with
/// black rather than shifting the face off-center.
fn crop_tensor(frame: &[u8], width: usize, height: usize, face: &FaceBox) -> Array4<f32> {
    let side = (face.width.max(face.height) * (1.0 + CROP_MARGIN)).max(1.0);
    let cx = face.x + face.width / 2.0;
    let cy = face.y + face.height / 2.0;
    let x0 = (cx - side / 2.0).round() as i32;
    let y0 = (cy - side / 2.0).round() as i32;
    let side_px = side.round() as usize;

    let cropped = raster::crop(frame, width, height, x0, y0, side_px, side_px);
    let scaled = raster::resize_bilinear(&cropped, side_px, side_px, EXPR_INPUT_SIZE, EXPR_INPUT_SIZE);

    let mut tensor = Array4::<f32>::zeros((1, 1, EXPR_INPUT_SIZE, EXPR_INPUT_SIZE));
    for y in 0..EXPR_INPUT_SIZE {
        for x in 0..EXPR_INPUT_SIZE {
            tensor[[0, 0, y, x]] = (scaled[y * EXPR_INPUT_SIZE + x] as f32 - EXPR_MEAN) / EXPR_STD;
        }
    }
    tensor
}

/// Numerically stable softmax. A degenerate sum yields a uniform
/// distribution instead of NaNs.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        exps.iter().map(|e| e / sum).collect()
    } else {
        vec![1.0 / logits.len().max(1) as f32; logits.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, 0.5, -1.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_softmax_preserves_order() {
        let probs = softmax(&[0.2, 3.0, -1.0]);
        assert!(probs[1] > probs[0]);
        assert!(probs[0] > probs[2]);
    }

    #[test]
    fn test_softmax_uniform_logits() {
        let probs = softmax(&[2.0, 2.0, 2.0, 2.0]);
        for p in probs {
            assert!((p - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_softmax_large_logits_stable() {
        let probs = softmax(&[1000.0, 999.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_crop_tensor_shape() {
        let frame = vec![128u8; 320 * 240];
        let face = FaceBox {
            x: 100.0,
            y: 80.0,
            width: 60.0,
            height: 80.0,
            confidence: 0.9,
        };
        let tensor = crop_tensor(&frame, 320, 240, &face);
        assert_eq!(tensor.shape(), &[1, 1, EXPR_INPUT_SIZE, EXPR_INPUT_SIZE]);
    }

    #[test]
    fn test_crop_tensor_normalization() {
        // A uniform mid-gray frame normalizes to ~0 everywhere.
        let frame = vec![128u8; 160 * 120];
        let face = FaceBox {
            x: 40.0,
            y: 30.0,
            width: 50.0,
            height: 50.0,
            confidence: 0.9,
        };
        let tensor = crop_tensor(&frame, 160, 120, &face);
        let val = tensor[[0, 0, 32, 32]];
        assert!(val.abs() < 0.01, "got {val}");
    }

    #[test]
    fn test_crop_tensor_face_at_edge() {
        // Face box hanging off the frame corner must not panic; the
        // overhang is black, which normalizes to -1.
        let frame = vec![255u8; 100 * 100];
        let face = FaceBox {
            x: -10.0,
            y: -10.0,
            width: 40.0,
            height: 40.0,
            confidence: 0.8,
        };
        let tensor = crop_tensor(&frame, 100, 100, &face);
        assert_eq!(tensor.shape(), &[1, 1, EXPR_INPUT_SIZE, EXPR_INPUT_SIZE]);
        assert!(tensor[[0, 0, 0, 0]] < -0.9);
    }
}
