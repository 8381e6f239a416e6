//! Startup sequencing and the detection poll loop.
//!
//! Startup is three ordered steps — load models, open camera, start the
//! poller — each publishing its status before it runs. The first failure
//! publishes a terminal `Failed` status and nothing further starts.
//!
//! The poller owns the camera and both ONNX sessions on one dedicated
//! thread, so ticks are strictly serialized: a slow sample delays the next
//! tick instead of overlapping it.

use crate::config::Config;
use crate::state::{StateHandle, Status};
use moodlens_core::{ExpressionPipeline, ExpressionScores, PipelineError};
use moodlens_hw::{Camera, CameraError};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StartError {
    #[error("model load failed: {0}")]
    ModelLoad(#[from] PipelineError),
    #[error("camera unavailable: {0}")]
    Camera(#[from] CameraError),
}

/// Failure of a single detection tick. Never fatal.
#[derive(Error, Debug)]
pub enum SampleError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// One sample of the live source: per-label scores, nothing usable yet,
/// or a transient failure.
pub trait ScoreSource {
    fn sample(&mut self) -> Result<Option<ExpressionScores>, SampleError>;
}

/// Camera-backed source: capture, readiness gate, classify.
pub struct CameraSource {
    camera: Camera,
    pipeline: ExpressionPipeline,
}

impl ScoreSource for CameraSource {
    fn sample(&mut self) -> Result<Option<ExpressionScores>, SampleError> {
        let frame = self.camera.capture_frame()?;
        if frame.is_dark() {
            // Sensor covered or still settling: nothing to decode yet.
            tracing::trace!(brightness = frame.avg_brightness(), "frame not ready");
            return Ok(None);
        }
        Ok(self.pipeline.classify(&frame.data, frame.width, frame.height)?)
    }
}

/// Handle to the running poll thread.
///
/// `stop` (or drop) signals the loop and joins it at the next tick
/// boundary; an in-flight sample finishes first.
pub struct PollerHandle {
    stop_tx: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl PollerHandle {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Run the startup sequence, then launch the poll loop.
pub fn start(config: &Config, state: StateHandle) -> Result<PollerHandle, StartError> {
    state.set_status(Status::LoadingModels);
    let pipeline = ExpressionPipeline::load(
        &config.face_model_path(),
        &config.expression_model_path(),
        config.face_threshold,
    )
    .map_err(|e| abort(&state, e))?;
    tracing::info!(dir = %config.model_dir.display(), "expression pipeline loaded");

    state.set_status(Status::StartingCamera);
    let camera = Camera::open(&config.camera_device).map_err(|e| abort(&state, e))?;
    camera.warm_up(config.warmup_frames);

    state.set_status(Status::Running);
    Ok(spawn_poller(
        CameraSource { camera, pipeline },
        state,
        config.poll_interval,
    ))
}

/// Publish a terminal status for a failed startup step and pass the error
/// through.
fn abort<E: Into<StartError>>(state: &StateHandle, err: E) -> StartError {
    let err = err.into();
    tracing::error!(error = %err, "startup halted");
    state.set_status(Status::Failed(err.to_string()));
    err
}

/// Spawn the poll loop on a dedicated thread.
///
/// The stop channel doubles as the tick clock: `recv_timeout` sleeps out
/// one interval unless a stop arrives first.
pub fn spawn_poller<S>(mut source: S, state: StateHandle, interval: Duration) -> PollerHandle
where
    S: ScoreSource + Send + 'static,
{
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    let join = thread::Builder::new()
        .name("moodlens-poller".into())
        .spawn(move || {
            tracing::info!(interval_ms = interval.as_millis() as u64, "poller started");
            loop {
                match stop_rx.recv_timeout(interval) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => tick(&mut source, &state),
                }
            }
            tracing::info!("poller stopped");
        })
        .expect("failed to spawn poller thread");

    PollerHandle {
        stop_tx,
        join: Some(join),
    }
}

/// One detection tick.
///
/// A failed or empty sample leaves the state untouched; the next scheduled
/// tick is the only retry.
fn tick<S: ScoreSource>(source: &mut S, state: &StateHandle) {
    match source.sample() {
        Ok(Some(scores)) => {
            if let Some(label) = scores.dominant() {
                state.set_emotion(label);
            }
        }
        Ok(None) => tracing::trace!("no face this tick"),
        Err(e) => tracing::debug!(error = %e, "tick failed, keeping previous emotion"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::profile_for;
    use moodlens_core::EmotionLabel;
    use std::collections::VecDeque;

    /// Scripted source: plays back queued results, then reports no face.
    struct FakeSource {
        script: VecDeque<Result<Option<ExpressionScores>, SampleError>>,
    }

    impl FakeSource {
        fn new(script: Vec<Result<Option<ExpressionScores>, SampleError>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl ScoreSource for FakeSource {
        fn sample(&mut self) -> Result<Option<ExpressionScores>, SampleError> {
            self.script.pop_front().unwrap_or(Ok(None))
        }
    }

    fn scores(pairs: &[(EmotionLabel, f32)]) -> ExpressionScores {
        ExpressionScores::new(pairs.to_vec())
    }

    fn capture_error() -> SampleError {
        SampleError::Camera(CameraError::CaptureFailed("scripted".into()))
    }

    #[test]
    fn test_tick_publishes_dominant_label() {
        let (state, _rx) = StateHandle::new();
        let mut source = FakeSource::new(vec![Ok(Some(scores(&[
            (EmotionLabel::Happy, 0.9),
            (EmotionLabel::Sad, 0.1),
        ])))]);

        tick(&mut source, &state);
        assert_eq!(state.snapshot().emotion, EmotionLabel::Happy);
    }

    #[test]
    fn test_tick_error_keeps_previous_emotion() {
        let (state, _rx) = StateHandle::new();
        state.set_emotion(EmotionLabel::Happy);

        let mut source = FakeSource::new(vec![Err(capture_error())]);
        tick(&mut source, &state);
        assert_eq!(state.snapshot().emotion, EmotionLabel::Happy);
    }

    #[test]
    fn test_tick_no_face_keeps_previous_emotion() {
        let (state, _rx) = StateHandle::new();
        state.set_emotion(EmotionLabel::Surprised);

        let mut source = FakeSource::new(vec![Ok(None)]);
        tick(&mut source, &state);
        assert_eq!(state.snapshot().emotion, EmotionLabel::Surprised);
    }

    #[test]
    fn test_tick_tie_is_deterministic() {
        // Equal maxima with the same input ordering must land on the same
        // label every tick.
        for _ in 0..10 {
            let (state, _rx) = StateHandle::new();
            let mut source = FakeSource::new(vec![Ok(Some(scores(&[
                (EmotionLabel::Sad, 0.5),
                (EmotionLabel::Angry, 0.5),
            ])))]);
            tick(&mut source, &state);
            assert_eq!(state.snapshot().emotion, EmotionLabel::Sad);
        }
    }

    #[test]
    fn test_start_with_missing_models_is_terminal() {
        let config = Config {
            camera_device: "/dev/null".into(),
            model_dir: "/nonexistent/moodlens-models".into(),
            poll_interval: Duration::from_millis(500),
            face_threshold: 0.6,
            warmup_frames: 0,
        };
        let (state, _rx) = StateHandle::new();

        let result = start(&config, state.clone());
        assert!(matches!(result, Err(StartError::ModelLoad(_))));

        let snap = state.snapshot();
        assert!(snap.status.is_terminal(), "status: {:?}", snap.status);
        // The poller never ran, so the emotion never left its default.
        assert_eq!(snap.emotion, EmotionLabel::Neutral);
    }

    #[tokio::test]
    async fn test_poller_end_to_end_with_fake_source() {
        let (state, mut rx) = StateHandle::new();
        state.set_status(Status::Running);
        let _ = rx.borrow_and_update();

        let source = FakeSource::new(vec![Ok(Some(scores(&[
            (EmotionLabel::Angry, 0.7),
            (EmotionLabel::Neutral, 0.3),
        ])))]);
        let handle = spawn_poller(source, state.clone(), Duration::from_millis(10));

        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("poller never published")
            .expect("state channel closed");

        let snap = rx.borrow_and_update().clone();
        assert_eq!(snap.emotion, EmotionLabel::Angry);

        // The renderer resolves the angry profile: help on, suggestions set.
        let profile = profile_for(snap.emotion);
        assert!(profile.show_help);
        assert!(!profile.suggestions.is_empty());

        handle.stop();
    }

    #[test]
    fn test_poller_stop_joins_thread() {
        let (state, _rx) = StateHandle::new();
        let source = FakeSource::new(vec![]);
        let handle = spawn_poller(source, state, Duration::from_millis(5));
        // Returns only after the thread exits.
        handle.stop();
    }
}
