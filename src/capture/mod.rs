//! Camera capture abstraction
//!
//! The engine never talks to a physical camera directly; it asks a
//! [`CaptureSource`] to open a [`CaptureStream`] matching a
//! [`CaptureRequest`]. The stream is singly-owned by the running session and
//! stopped by the session lifecycle manager before GPU resources are
//! released. [`SyntheticCamera`] provides an in-process implementation so the
//! whole engine runs (and is tested) without hardware.

pub mod synthetic;

use std::time::Duration;

use thiserror::Error;

use crate::error::SessionError;

pub use synthetic::SyntheticCamera;

/// Which way the camera should face. Rear is preferred for AR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingMode {
    #[default]
    Rear,
    Front,
}

/// Parameters for capture acquisition.
///
/// Must be submitted synchronously from a user-initiated action so hosts
/// that gate permission prompts on gestures can show them.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub facing: FacingMode,
    /// Hard floor; acquisition fails with a constraint error below this.
    pub min_width: u32,
    pub min_height: u32,
    /// Preferred resolution; sources may deliver less but not below min.
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            facing: FacingMode::Rear,
            min_width: 640,
            min_height: 480,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// One camera frame, tightly packed RGBA8.
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl CaptureFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Mean of the RGB channels for the pixel at `index` (alpha ignored).
    pub fn mean_intensity(&self, index: usize) -> u8 {
        let base = index * 4;
        let r = self.pixels[base] as u16;
        let g = self.pixels[base + 1] as u16;
        let b = self.pixels[base + 2] as u16;
        ((r + g + b) / 3) as u8
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }
}

/// Ways capture acquisition or readiness can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("no matching device")]
    DeviceUnavailable,
    #[error("device busy")]
    DeviceBusy,
    #[error("constraints unsatisfiable: {0}")]
    ConstraintUnsatisfiable(String),
    #[error("insecure context")]
    InsecureContext,
    #[error("no frame within {}ms", .waited.as_millis())]
    Timeout { waited: Duration },
}

impl From<CaptureError> for SessionError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::PermissionDenied => SessionError::PermissionDenied,
            CaptureError::DeviceUnavailable => SessionError::DeviceUnavailable,
            CaptureError::DeviceBusy => SessionError::DeviceBusy,
            CaptureError::ConstraintUnsatisfiable(detail) => {
                SessionError::ConstraintUnsatisfiable(detail)
            }
            CaptureError::InsecureContext => SessionError::InsecureContext,
            CaptureError::Timeout { waited } => SessionError::SurfaceTimeout { waited },
        }
    }
}

/// A camera (or camera-like) device the engine can acquire frames from.
pub trait CaptureSource {
    /// Opens a stream matching the request.
    ///
    /// Called synchronously from the user-gesture path; implementations that
    /// need to prompt for permission must do so here.
    fn open(&mut self, request: &CaptureRequest) -> Result<Box<dyn CaptureStream>, CaptureError>;
}

/// A live capture stream owned by exactly one session.
pub trait CaptureStream {
    /// Blocks until the stream has produced its first frame, or fails with
    /// [`CaptureError::Timeout`] once `timeout` elapses. The render loop must
    /// not start before this resolves.
    fn wait_ready(&mut self, timeout: Duration) -> Result<(), CaptureError>;

    /// The most recent frame, if one is available right now.
    fn latest_frame(&mut self) -> Option<CaptureFrame>;

    /// Negotiated resolution.
    fn resolution(&self) -> (u32, u32);

    /// Stops the underlying tracks. Safe to call more than once; frames stop
    /// arriving after the first call.
    fn stop(&mut self);

    fn is_stopped(&self) -> bool;
}
