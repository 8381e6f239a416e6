use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, loaded from environment variables.
pub struct Config {
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
    /// Interval between detection ticks.
    pub poll_interval: Duration,
    /// Minimum face confidence for the locator to report a face.
    pub face_threshold: f32,
    /// Frames discarded at startup for AGC/AE stabilization.
    pub warmup_frames: usize,
}

impl Config {
    /// Load configuration from `MOODLENS_*` environment variables with
    /// defaults.
    pub fn from_env() -> Self {
        let model_dir = std::env::var("MOODLENS_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| moodlens_core::default_model_dir());

        Self {
            camera_device: std::env::var("MOODLENS_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            model_dir,
            poll_interval: Duration::from_millis(env_u64("MOODLENS_POLL_INTERVAL_MS", 500)),
            face_threshold: env_f32("MOODLENS_FACE_THRESHOLD", 0.6),
            warmup_frames: env_usize("MOODLENS_WARMUP_FRAMES", 4),
        }
    }

    /// Path to the face detection model.
    pub fn face_model_path(&self) -> String {
        self.model_dir
            .join("face-rfb-320.onnx")
            .to_string_lossy()
            .into_owned()
    }

    /// Path to the expression classifier model.
    pub fn expression_model_path(&self) -> String {
        self.model_dir
            .join("expr-fer-5.onnx")
            .to_string_lossy()
            .into_owned()
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
