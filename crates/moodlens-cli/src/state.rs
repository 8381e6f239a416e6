//! The reactive UI state store.
//!
//! One mutable value for the whole system: current emotion plus lifecycle
//! status. All writes funnel through [`StateHandle`]; renderers observe a
//! `watch::Receiver` and re-resolve their presentation on change.

use moodlens_core::EmotionLabel;
use std::fmt;
use tokio::sync::watch;

/// Lifecycle status surfaced to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    LoadingModels,
    StartingCamera,
    Running,
    /// Absorbing: a startup step failed and nothing further will start.
    Failed(String),
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Failed(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::LoadingModels => f.write_str("loading expression models"),
            Status::StartingCamera => f.write_str("starting camera"),
            Status::Running => f.write_str("running"),
            Status::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Current emotion plus lifecycle status.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub emotion: EmotionLabel,
    pub status: Status,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            emotion: EmotionLabel::Neutral,
            status: Status::LoadingModels,
        }
    }
}

/// Single-writer handle over the shared state.
///
/// Clone-safe; clones share the same underlying channel so the
/// single-update-entry-point property holds across the sequencer and the
/// poller.
#[derive(Clone)]
pub struct StateHandle {
    tx: watch::Sender<UiState>,
}

impl StateHandle {
    pub fn new() -> (Self, watch::Receiver<UiState>) {
        let (tx, rx) = watch::channel(UiState::default());
        (Self { tx }, rx)
    }

    pub fn set_status(&self, status: Status) {
        tracing::info!(status = %status, "status change");
        self.tx.send_modify(|s| s.status = status);
    }

    /// Publish a new emotion. Unchanged values do not wake observers.
    pub fn set_emotion(&self, emotion: EmotionLabel) {
        self.tx.send_if_modified(|s| {
            if s.emotion == emotion {
                false
            } else {
                tracing::debug!(emotion = %emotion, "emotion change");
                s.emotion = emotion;
                true
            }
        });
    }

    /// Current state, cloned out of the channel.
    pub fn snapshot(&self) -> UiState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let (handle, _rx) = StateHandle::new();
        let snap = handle.snapshot();
        assert_eq!(snap.emotion, EmotionLabel::Neutral);
        assert_eq!(snap.status, Status::LoadingModels);
    }

    #[test]
    fn test_set_emotion_notifies() {
        let (handle, mut rx) = StateHandle::new();
        handle.set_emotion(EmotionLabel::Happy);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().emotion, EmotionLabel::Happy);
    }

    #[test]
    fn test_set_same_emotion_does_not_notify() {
        let (handle, mut rx) = StateHandle::new();
        handle.set_emotion(EmotionLabel::Happy);
        let _ = rx.borrow_and_update();
        handle.set_emotion(EmotionLabel::Happy);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_failed_status_is_terminal() {
        assert!(Status::Failed("camera gone".into()).is_terminal());
        assert!(!Status::Running.is_terminal());
        assert!(!Status::LoadingModels.is_terminal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::StartingCamera.to_string(), "starting camera");
        assert_eq!(
            Status::Failed("no device".into()).to_string(),
            "failed: no device"
        );
    }
}
