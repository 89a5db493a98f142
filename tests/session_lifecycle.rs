//! Session lifecycle integration tests
//!
//! Exercise the manager end to end with counting test doubles behind the
//! capture, XR and renderer seams: every exit path must stop the capture
//! stream and dispose the renderer exactly once, stop must be idempotent,
//! and acquisition failures must surface as their own error kinds.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use garnish::capture::{
    CaptureError, CaptureFrame, CaptureRequest, CaptureSource, CaptureStream,
};
use garnish::error::SessionError;
use garnish::gfx::scene::ArScene;
use garnish::gfx::scene_renderer::SessionRenderer;
use garnish::menu::MenuItem;
use garnish::session::{ActiveMode, SessionConfig, SessionManager, SessionPhase};
use garnish::xr::{ScriptedXr, UnsupportedXr, XrFrame, XrPose, XrRuntime, XrSupport};
use garnish::anchor::HeuristicConfig;

#[derive(Default)]
struct Hooks {
    stream_stops: AtomicUsize,
    stream_opens: AtomicUsize,
    renderer_disposes: AtomicUsize,
    xr_begins: AtomicUsize,
    xr_ends: AtomicUsize,
}

/// Camera double with scriptable open/readiness behavior.
struct MockCamera {
    hooks: Arc<Hooks>,
    fail_open: Option<CaptureError>,
    never_ready: bool,
    /// Frame luminance split: fraction of dark rows (0.0 = blank frame).
    dark_fraction: f32,
}

impl MockCamera {
    fn good(hooks: Arc<Hooks>) -> Self {
        Self {
            hooks,
            fail_open: None,
            never_ready: false,
            dark_fraction: 0.4,
        }
    }

    fn blank(hooks: Arc<Hooks>) -> Self {
        Self {
            dark_fraction: 0.0,
            ..Self::good(hooks)
        }
    }

    fn failing(hooks: Arc<Hooks>, err: CaptureError) -> Self {
        Self {
            fail_open: Some(err),
            ..Self::good(hooks)
        }
    }

    fn never_ready(hooks: Arc<Hooks>) -> Self {
        Self {
            never_ready: true,
            ..Self::good(hooks)
        }
    }
}

impl CaptureSource for MockCamera {
    fn open(&mut self, request: &CaptureRequest) -> Result<Box<dyn CaptureStream>, CaptureError> {
        self.hooks.stream_opens.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_open.clone() {
            return Err(err);
        }
        Ok(Box::new(MockStream {
            hooks: self.hooks.clone(),
            width: request.ideal_width,
            height: request.ideal_height,
            never_ready: self.never_ready,
            dark_fraction: self.dark_fraction,
            stopped: false,
        }))
    }
}

struct MockStream {
    hooks: Arc<Hooks>,
    width: u32,
    height: u32,
    never_ready: bool,
    dark_fraction: f32,
    stopped: bool,
}

impl CaptureStream for MockStream {
    fn wait_ready(&mut self, timeout: Duration) -> Result<(), CaptureError> {
        if self.never_ready {
            Err(CaptureError::Timeout { waited: timeout })
        } else {
            Ok(())
        }
    }

    fn latest_frame(&mut self) -> Option<CaptureFrame> {
        if self.stopped {
            return None;
        }
        let (w, h) = (self.width, self.height);
        let dark_rows = (h as f32 * self.dark_fraction) as u32;
        let mut pixels = Vec::with_capacity((w * h * 4) as usize);
        for y in 0..h {
            for _x in 0..w {
                let v = if y < dark_rows { 30 } else { 215 };
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Some(CaptureFrame::new(w, h, pixels))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.hooks.stream_stops.fetch_add(1, Ordering::SeqCst);
            self.stopped = true;
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }
}

/// Renderer double: counts disposals, never touches a GPU.
struct MockRenderer {
    hooks: Arc<Hooks>,
}

impl SessionRenderer for MockRenderer {
    fn prepare(&mut self, _scene: &mut ArScene, _background: Option<&CaptureFrame>) {}

    fn draw(&mut self, _scene: &ArScene, _pass: &mut wgpu::RenderPass<'_>) {}

    fn dispose(self: Box<Self>) {
        self.hooks.renderer_disposes.fetch_add(1, Ordering::SeqCst);
    }
}

/// XR double that wraps [`ScriptedXr`] with begin/end counters.
struct ProbeXr {
    hooks: Arc<Hooks>,
    inner: ScriptedXr,
}

impl XrRuntime for ProbeXr {
    fn support(&self) -> XrSupport {
        self.inner.support()
    }

    fn begin_session(&mut self) -> Result<(), SessionError> {
        self.hooks.xr_begins.fetch_add(1, Ordering::SeqCst);
        self.inner.begin_session()
    }

    fn next_frame(&mut self) -> Option<XrFrame> {
        self.inner.next_frame()
    }

    fn end_session(&mut self) {
        self.hooks.xr_ends.fetch_add(1, Ordering::SeqCst);
        self.inner.end_session();
    }
}

fn item() -> MenuItem {
    MenuItem {
        id: 1,
        name: "Margherita Pizza".into(),
        description: String::new(),
        price: 15.99,
        category: "Pizza".into(),
        thumbnail_ref: String::new(),
        asset_ref: None,
    }
}

fn fast_config() -> SessionConfig {
    SessionConfig {
        capture_request: CaptureRequest {
            min_width: 64,
            min_height: 48,
            ideal_width: 128,
            ideal_height: 96,
            ..CaptureRequest::default()
        },
        heuristic: HeuristicConfig {
            sample_interval: Duration::ZERO,
            debounce_frames: 2,
            ..HeuristicConfig::default()
        },
        ..SessionConfig::default()
    }
}

fn manager_with(
    hooks: &Arc<Hooks>,
    capture: impl CaptureSource + 'static,
    xr: impl XrRuntime + 'static,
) -> SessionManager {
    let renderer_hooks = hooks.clone();
    SessionManager::new(
        Box::new(capture),
        Box::new(xr),
        Box::new(move |_scene| {
            Box::new(MockRenderer {
                hooks: renderer_hooks.clone(),
            })
        }),
        fast_config(),
    )
}

#[test]
fn heuristic_session_places_and_releases_once() {
    let hooks = Arc::new(Hooks::default());
    let mut manager = manager_with(&hooks, MockCamera::good(hooks.clone()), UnsupportedXr);

    manager.start(&item()).unwrap();
    assert_eq!(*manager.phase(), SessionPhase::Active(ActiveMode::Searching));

    // Two surface-like samples satisfy the two-frame debounce.
    let t0 = Instant::now();
    manager.tick(t0);
    manager.tick(t0 + Duration::from_millis(16));
    assert_eq!(*manager.phase(), SessionPhase::Active(ActiveMode::Placed));

    let (_renderer, scene) = manager.render_parts().unwrap();
    assert!(scene.model.visible);

    manager.stop();
    assert!(manager.phase().is_idle());
    assert_eq!(hooks.stream_stops.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.renderer_disposes.load(Ordering::SeqCst), 1);

    // Idempotent: stopping again changes nothing.
    manager.stop();
    assert!(manager.phase().is_idle());
    assert_eq!(hooks.stream_stops.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.renderer_disposes.load(Ordering::SeqCst), 1);
}

#[test]
fn stop_while_idle_is_a_no_op() {
    let hooks = Arc::new(Hooks::default());
    let mut manager = manager_with(&hooks, MockCamera::good(hooks.clone()), UnsupportedXr);

    manager.stop();
    manager.stop();
    assert!(manager.phase().is_idle());
    assert_eq!(hooks.stream_stops.load(Ordering::SeqCst), 0);
    assert_eq!(hooks.renderer_disposes.load(Ordering::SeqCst), 0);
}

#[test]
fn model_stays_hidden_without_a_surface() {
    let hooks = Arc::new(Hooks::default());
    let mut manager = manager_with(&hooks, MockCamera::blank(hooks.clone()), UnsupportedXr);

    manager.start(&item()).unwrap();
    let t0 = Instant::now();
    for i in 0..20 {
        manager.tick(t0 + Duration::from_millis(16 * i));
    }
    assert_eq!(*manager.phase(), SessionPhase::Active(ActiveMode::Searching));
    let (_renderer, scene) = manager.render_parts().unwrap();
    assert!(!scene.model.visible);

    manager.stop();
}

#[test]
fn acquisition_failures_surface_distinct_errors() {
    let cases = [
        (CaptureError::PermissionDenied, SessionError::PermissionDenied),
        (CaptureError::DeviceUnavailable, SessionError::DeviceUnavailable),
        (CaptureError::DeviceBusy, SessionError::DeviceBusy),
        (CaptureError::InsecureContext, SessionError::InsecureContext),
    ];

    for (capture_err, expected) in cases {
        let hooks = Arc::new(Hooks::default());
        let mut manager = manager_with(
            &hooks,
            MockCamera::failing(hooks.clone(), capture_err),
            UnsupportedXr,
        );

        let err = manager.start(&item()).unwrap_err();
        assert_eq!(err, expected);
        assert_eq!(*manager.phase(), SessionPhase::Error(expected));

        // Nothing was acquired, so nothing to release.
        assert_eq!(hooks.stream_stops.load(Ordering::SeqCst), 0);
        assert_eq!(hooks.renderer_disposes.load(Ordering::SeqCst), 0);
    }
}

#[test]
fn surface_timeout_releases_the_partially_acquired_stream() {
    let hooks = Arc::new(Hooks::default());
    let mut manager = manager_with(&hooks, MockCamera::never_ready(hooks.clone()), UnsupportedXr);

    let err = manager.start(&item()).unwrap_err();
    assert!(matches!(err, SessionError::SurfaceTimeout { .. }));
    assert!(matches!(manager.phase(), SessionPhase::Error(_)));

    // The stream was opened, then stopped on the error path; the renderer
    // never existed.
    assert_eq!(hooks.stream_opens.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.stream_stops.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.renderer_disposes.load(Ordering::SeqCst), 0);

    // Stop after error stays idle and releases nothing twice.
    manager.stop();
    assert!(manager.phase().is_idle());
    assert_eq!(hooks.stream_stops.load(Ordering::SeqCst), 1);
}

#[test]
fn error_phase_allows_retry() {
    let hooks = Arc::new(Hooks::default());
    let mut manager = manager_with(
        &hooks,
        MockCamera::failing(hooks.clone(), CaptureError::DeviceBusy),
        UnsupportedXr,
    );

    assert!(manager.start(&item()).is_err());
    assert!(manager.start(&item()).is_err());
    // Both attempts actually reached acquisition.
    assert_eq!(hooks.stream_opens.load(Ordering::SeqCst), 2);
}

#[test]
fn spatial_session_confirms_irreversibly_and_ends_runtime() {
    let hooks = Arc::new(Hooks::default());
    let frames = vec![
        XrFrame {
            viewer: XrPose::at(0.0, 1.6, 0.0),
            hit: Some(XrPose::at(0.25, 0.0, -1.0)),
            select: false,
        },
        XrFrame {
            viewer: XrPose::at(0.0, 1.6, 0.0),
            hit: Some(XrPose::at(0.25, 0.0, -1.0)),
            select: true,
        },
        // Hit results keep arriving elsewhere after confirmation.
        XrFrame {
            viewer: XrPose::at(0.0, 1.6, 0.0),
            hit: Some(XrPose::at(5.0, 0.0, -2.0)),
            select: false,
        },
    ];
    let xr = ProbeXr {
        hooks: hooks.clone(),
        inner: ScriptedXr::new(frames),
    };
    let mut manager = manager_with(&hooks, MockCamera::good(hooks.clone()), xr);

    manager.start(&item()).unwrap();
    assert_eq!(hooks.xr_begins.load(Ordering::SeqCst), 1);
    // Spatial strategy never opens the camera.
    assert_eq!(hooks.stream_opens.load(Ordering::SeqCst), 0);

    let t0 = Instant::now();
    manager.tick(t0);
    assert_eq!(*manager.phase(), SessionPhase::Active(ActiveMode::Searching));

    manager.tick(t0 + Duration::from_millis(16));
    assert_eq!(*manager.phase(), SessionPhase::Active(ActiveMode::Placed));

    let placed_pose = {
        let (_renderer, scene) = manager.render_parts().unwrap();
        scene.model.anchor_pose
    };

    // Later hits must not move the confirmed anchor.
    manager.tick(t0 + Duration::from_millis(32));
    let (_renderer, scene) = manager.render_parts().unwrap();
    assert_eq!(scene.model.anchor_pose, placed_pose);

    manager.stop();
    assert_eq!(hooks.xr_ends.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.renderer_disposes.load(Ordering::SeqCst), 1);
}

#[test]
fn negotiation_failure_is_typed_and_clean() {
    let hooks = Arc::new(Hooks::default());
    let xr = ProbeXr {
        hooks: hooks.clone(),
        inner: ScriptedXr::failing_negotiation("hit-test unavailable"),
    };
    let mut manager = manager_with(&hooks, MockCamera::good(hooks.clone()), xr);

    let err = manager.start(&item()).unwrap_err();
    assert!(matches!(err, SessionError::SessionNegotiationFailed(_)));
    assert_eq!(hooks.renderer_disposes.load(Ordering::SeqCst), 0);
    assert_eq!(hooks.stream_opens.load(Ordering::SeqCst), 0);
}

#[test]
fn drop_releases_resources() {
    let hooks = Arc::new(Hooks::default());
    {
        let mut manager = manager_with(&hooks, MockCamera::good(hooks.clone()), UnsupportedXr);
        manager.start(&item()).unwrap();
    } // view unmount
    assert_eq!(hooks.stream_stops.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.renderer_disposes.load(Ordering::SeqCst), 1);
}
