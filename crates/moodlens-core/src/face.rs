//! Single-shot face locator via ONNX Runtime.
//!
//! Runs an RFB-320-class detection model whose exports carry already-decoded
//! candidate boxes: one score tensor `[1, N, 2]` (background/face pairs) and
//! one box tensor `[1, N, 4]` of normalized corner coordinates. Only the
//! best-scoring face is kept — the downstream classifier works on a single
//! dominant face per frame.

use crate::raster;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const LOCATOR_INPUT_WIDTH: usize = 320;
const LOCATOR_INPUT_HEIGHT: usize = 240;
const LOCATOR_MEAN: f32 = 127.0;
const LOCATOR_STD: f32 = 128.0;
/// Values per candidate in the score tensor: [background, face].
const SCORES_PER_CANDIDATE: usize = 2;
/// Values per candidate in the box tensor: [x1, y1, x2, y2], normalized.
const COORDS_PER_CANDIDATE: usize = 4;

#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// A located face in frame pixel coordinates.
#[derive(Debug, Clone)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

/// Output tensor slots: (scores_idx, boxes_idx).
type OutputIndices = (usize, usize);

/// RFB-320-class single-shot face locator.
pub struct FaceLocator {
    session: Session,
    threshold: f32,
    /// Slots for the score and box tensors, discovered by name at load
    /// time; falls back to positional ordering.
    outputs: OutputIndices,
}

impl FaceLocator {
    /// Load the face detection ONNX model from the given path.
    pub fn load(model_path: &str, threshold: f32) -> Result<Self, LocatorError> {
        if !Path::new(model_path).exists() {
            return Err(LocatorError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let output_names: Vec<String> =
            session.outputs().iter().map(|o| o.name().to_string()).collect();

        if output_names.len() < 2 {
            return Err(LocatorError::InferenceFailed(format!(
                "face model requires 2 outputs (scores, boxes), got {}",
                output_names.len()
            )));
        }

        let outputs = discover_outputs(&output_names);

        tracing::info!(
            path = model_path,
            outputs = ?output_names,
            slots = ?outputs,
            "loaded face locator model"
        );

        Ok(Self {
            session,
            threshold,
            outputs,
        })
    }

    /// Locate the best face in a grayscale frame.
    ///
    /// Returns `None` when no candidate clears the confidence threshold.
    pub fn locate(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Option<FaceBox>, LocatorError> {
        let input = frame_tensor(frame, width as usize, height as usize);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (scores_idx, boxes_idx) = self.outputs;
        let (_, scores) = outputs[scores_idx]
            .try_extract_tensor::<f32>()
            .map_err(|e| LocatorError::InferenceFailed(format!("scores: {e}")))?;
        let (_, boxes) = outputs[boxes_idx]
            .try_extract_tensor::<f32>()
            .map_err(|e| LocatorError::InferenceFailed(format!("boxes: {e}")))?;

        let candidates = scores.len() / SCORES_PER_CANDIDATE;
        if boxes.len() / COORDS_PER_CANDIDATE != candidates {
            return Err(LocatorError::InferenceFailed(format!(
                "tensor mismatch: {} score pairs vs {} boxes",
                candidates,
                boxes.len() / COORDS_PER_CANDIDATE
            )));
        }

        Ok(best_box(scores, boxes, width, height, self.threshold))
    }
}

/// Discover score/box output slots by name, positional fallback otherwise.
///
/// RFB-320 exports name their outputs "scores" and "boxes"; some converters
/// emit generic numeric names, in which case the conventional order
/// (scores first, boxes second) applies.
fn discover_outputs(names: &[String]) -> OutputIndices {
    let scores = names.iter().position(|n| n == "scores");
    let boxes = names.iter().position(|n| n == "boxes");
    match (scores, boxes) {
        (Some(s), Some(b)) => (s, b),
        _ => {
            tracing::info!(?names, "output names not recognized, using positional order");
            (0, 1)
        }
    }
}

/// Scan candidates and keep the highest face score above the threshold,
/// with its box mapped back to frame pixel coordinates.
///
/// The model input is a plain (non-letterboxed) resize, so normalized
/// corners scale straight back to the frame. Strict `>` keeps the first
/// candidate on equal scores.
fn best_box(
    scores: &[f32],
    boxes: &[f32],
    frame_w: u32,
    frame_h: u32,
    threshold: f32,
) -> Option<FaceBox> {
    let candidates = scores.len() / SCORES_PER_CANDIDATE;
    let mut best: Option<FaceBox> = None;

    for i in 0..candidates {
        let confidence = scores[i * SCORES_PER_CANDIDATE + 1];
        if confidence <= threshold {
            continue;
        }
        if best.as_ref().is_some_and(|b| confidence <= b.confidence) {
            continue;
        }

        let off = i * COORDS_PER_CANDIDATE;
        let x1 = boxes[off].clamp(0.0, 1.0) * frame_w as f32;
        let y1 = boxes[off + 1].clamp(0.0, 1.0) * frame_h as f32;
        let x2 = boxes[off + 2].clamp(0.0, 1.0) * frame_w as f32;
        let y2 = boxes[off + 3].clamp(0.0, 1.0) * frame_h as f32;

        best = Some(FaceBox {
            x: x1,
            y: y1,
            width: (x2 - x1).max(0.0),
            height: (y2 - y1).max(0.0),
            confidence,
        });
    }

    best
}

/// Resize a grayscale frame to the model input and normalize into a
/// NCHW float tensor, replicating luma across the three channels.
fn frame_tensor(frame: &[u8], width: usize, height: usize) -> Array4<f32> {
    let resized = raster::resize_bilinear(
        frame,
        width,
        height,
        LOCATOR_INPUT_WIDTH,
        LOCATOR_INPUT_HEIGHT,
    );

    let mut tensor = Array4::<f32>::zeros((1, 3, LOCATOR_INPUT_HEIGHT, LOCATOR_INPUT_WIDTH));
    for y in 0..LOCATOR_INPUT_HEIGHT {
        for x in 0..LOCATOR_INPUT_WIDTH {
            let normalized =
                (resized[y * LOCATOR_INPUT_WIDTH + x] as f32 - LOCATOR_MEAN) / LOCATOR_STD;
            tensor[[0, 0, y, x]] = normalized;
            tensor[[0, 1, y, x]] = normalized;
            tensor[[0, 2, y, x]] = normalized;
        }
    }
    tensor
}
