//! Session error taxonomy
//!
//! Every way an AR session can fail to start or die at runtime gets its own
//! variant with its own user-facing message. The one deliberate exception is
//! asset loading: a model that fails to load falls back to procedural
//! synthesis inside the resolver and never surfaces here.

use std::time::Duration;

use thiserror::Error;

/// Failure reasons surfaced to the user when a session cannot start or
/// aborts at runtime.
///
/// Acquisition failures move the session to its error state after all
/// partially-acquired resources have been released; retry or
/// return-to-menu are the only exits from there.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Host has no AR or camera capability at all.
    #[error("this device has no AR or camera capability")]
    CapabilityUnsupported,

    /// User declined camera/XR access.
    #[error("camera access was denied - please grant permission and retry")]
    PermissionDenied,

    /// No hardware matches the capture request.
    #[error("no suitable camera hardware was found")]
    DeviceUnavailable,

    /// The capture device is held by another consumer.
    #[error("the camera is in use by another application")]
    DeviceBusy,

    /// The requested capture parameters cannot be met.
    #[error("the requested capture parameters cannot be met: {0}")]
    ConstraintUnsatisfiable(String),

    /// Required transport security is missing.
    #[error("camera access requires a secure context")]
    InsecureContext,

    /// Host-level XR session setup failed.
    #[error("AR session negotiation failed: {0}")]
    SessionNegotiationFailed(String),

    /// The output surface never produced a frame within the bound.
    #[error("camera surface not ready after {}ms", .waited.as_millis())]
    SurfaceTimeout { waited: Duration },
}
