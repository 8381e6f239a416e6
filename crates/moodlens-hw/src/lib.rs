//! moodlens-hw — camera capture for the detection poller.
//!
//! V4L2 access with YUYV/GREY/Y16 negotiation, single-frame capture, and
//! the dark-frame readiness gate the poller uses to skip unusable ticks.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, DeviceInfo, PixelFormat};
pub use frame::Frame;
