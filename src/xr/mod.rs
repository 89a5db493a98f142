//! XR runtime abstraction
//!
//! World-tracked AR (hit-testing against real surfaces) depends on a host
//! runtime the engine cannot assume. [`XrRuntime`] is the seam: the session
//! manager queries [`XrRuntime::support`] once per view mount and, when the
//! answer is yes, negotiates a session and pulls one [`XrFrame`] per render
//! tick. [`ScriptedXr`] replays canned frames for demos and tests;
//! [`UnsupportedXr`] is the desktop default that forces the heuristic
//! fallback.

use std::collections::VecDeque;

use cgmath::{Quaternion, Vector3};

use crate::error::SessionError;

/// Result of the once-per-mount capability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrSupport {
    Supported,
    Unsupported,
    /// The host could not answer (query raced or errored); treated as
    /// unsupported when selecting a strategy.
    Unknown,
}

/// A 6-DOF pose in the runtime's reference space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XrPose {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

impl XrPose {
    pub fn new(position: Vector3<f32>, orientation: Quaternion<f32>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Identity orientation at a position.
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }
}

/// Everything the runtime reports for one render tick.
#[derive(Debug, Clone, Copy)]
pub struct XrFrame {
    pub viewer: XrPose,
    /// Topmost hit-test intersection of the viewer ray with a recognized
    /// real-world surface, if any.
    pub hit: Option<XrPose>,
    /// Whether a discrete select input arrived since the previous frame.
    pub select: bool,
}

/// A host XR runtime capable of world tracking.
pub trait XrRuntime {
    /// Capability query; consulted once per view mount.
    fn support(&self) -> XrSupport;

    /// Negotiates an immersive session with hit-testing enabled.
    fn begin_session(&mut self) -> Result<(), SessionError>;

    /// Pulls the frame for the current render tick. `None` means the
    /// runtime produced no frame (session winding down).
    fn next_frame(&mut self) -> Option<XrFrame>;

    /// Ends the session. Safe to call when no session is active.
    fn end_session(&mut self);
}

/// Desktop default: no world tracking available.
pub struct UnsupportedXr;

impl XrRuntime for UnsupportedXr {
    fn support(&self) -> XrSupport {
        XrSupport::Unsupported
    }

    fn begin_session(&mut self) -> Result<(), SessionError> {
        Err(SessionError::CapabilityUnsupported)
    }

    fn next_frame(&mut self) -> Option<XrFrame> {
        None
    }

    fn end_session(&mut self) {}
}

/// Replays a scripted sequence of frames, for tests and demos.
///
/// Once the script is exhausted the last frame is repeated (with `select`
/// cleared) so a running loop keeps getting poses.
pub struct ScriptedXr {
    support: XrSupport,
    negotiation_error: Option<SessionError>,
    frames: VecDeque<XrFrame>,
    last: Option<XrFrame>,
    in_session: bool,
}

impl ScriptedXr {
    pub fn new(frames: Vec<XrFrame>) -> Self {
        Self {
            support: XrSupport::Supported,
            negotiation_error: None,
            frames: frames.into(),
            last: None,
            in_session: false,
        }
    }

    /// A runtime that reports support but fails session negotiation.
    pub fn failing_negotiation(reason: &str) -> Self {
        Self {
            negotiation_error: Some(SessionError::SessionNegotiationFailed(reason.to_string())),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_support(mut self, support: XrSupport) -> Self {
        self.support = support;
        self
    }

    pub fn in_session(&self) -> bool {
        self.in_session
    }
}

impl XrRuntime for ScriptedXr {
    fn support(&self) -> XrSupport {
        self.support
    }

    fn begin_session(&mut self) -> Result<(), SessionError> {
        if let Some(err) = self.negotiation_error.clone() {
            return Err(err);
        }
        self.in_session = true;
        Ok(())
    }

    fn next_frame(&mut self) -> Option<XrFrame> {
        if !self.in_session {
            return None;
        }
        match self.frames.pop_front() {
            Some(frame) => {
                self.last = Some(frame);
                Some(frame)
            }
            None => self.last.map(|mut frame| {
                frame.select = false;
                frame
            }),
        }
    }

    fn end_session(&mut self) {
        self.in_session = false;
    }
}
