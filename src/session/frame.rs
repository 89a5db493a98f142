//! Render loop driver
//!
//! One [`FrameDriver`] lives for the `active` span of one session and runs
//! the per-tick sequence, in order: re-evaluate the anchor provider (while
//! searching), advance animation by the wall-clock delta, apply the idle
//! yaw (heuristic strategy, placed, not mid-gesture), and leave the scene
//! ready for the draw call the manager issues next. The driver is created
//! only after capture acquisition has fully resolved, so it structurally
//! cannot tick against a missing surface, and it is dropped (exactly once)
//! when the session leaves `active`.

use std::time::Instant;

use cgmath::Rad;

use crate::anchor::{AnchorStrategy, FrameInput};
use crate::capture::CaptureFrame;
use crate::gfx::scene::ArScene;
use crate::placement::PlacementController;
use crate::xr::XrFrame;

/// Everything one tick may touch.
pub struct TickInput<'a> {
    pub now: Instant,
    pub xr_frame: Option<XrFrame>,
    pub camera_frame: Option<&'a CaptureFrame>,
    /// True while the user is mid-drag; suspends the idle spin.
    pub dragging: bool,
}

pub struct FrameDriver {
    last_tick: Option<Instant>,
    idle_spin: Rad<f32>,
}

impl FrameDriver {
    /// # Arguments
    /// * `idle_spin_degrees` - Idle yaw rate in degrees per second
    pub fn new(idle_spin_degrees: f32) -> Self {
        Self {
            last_tick: None,
            idle_spin: Rad(idle_spin_degrees.to_radians()),
        }
    }

    /// Runs one tick over the session's placement and scene.
    pub fn tick(
        &mut self,
        input: TickInput<'_>,
        placement: &mut PlacementController,
        scene: &mut ArScene,
    ) {
        let dt = match self.last_tick {
            Some(last) => input.now.duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_tick = Some(input.now);

        // 1. Anchor re-evaluation. The spatial provider freezes itself once
        // confirmed; the heuristic keeps toggling visibility.
        placement.update(&FrameInput {
            xr: input.xr_frame,
            camera: input.camera_frame,
            now: input.now,
        });

        if let Some(frame) = input.xr_frame {
            scene.camera.set_view_from_pose(&frame.viewer);
        }

        let placed = placement.placed();
        scene.reticle.track(placement.cursor().as_ref());
        scene.model.visible = placed;
        if let Some(anchor) = placement.anchor() {
            scene.model.anchor_pose = anchor.pose_matrix();
        }

        // 2. Animation advances by wall-clock delta.
        scene.model.mixer.advance(dt);

        // 3. Idle liveness spin, heuristic strategy only.
        if placed && !input.dragging && placement.strategy() == AnchorStrategy::HeuristicMarker {
            scene.model.add_yaw(Rad(self.idle_spin.0 * dt));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::anchor::{HeuristicConfig, HitTestProvider, MarkerHeuristicProvider};
    use crate::assets::ArchetypeTag;
    use crate::gfx::model::Model;
    use crate::xr::XrPose;

    fn scene() -> ArScene {
        ArScene::new(Model::from_parts(ArchetypeTag::Generic.build()), 640, 480)
    }

    fn surface_frame() -> CaptureFrame {
        let (w, h) = (64u32, 64u32);
        let mut pixels = Vec::with_capacity((w * h * 4) as usize);
        for y in 0..h {
            for _x in 0..w {
                let v = if y < h / 2 { 30 } else { 220 };
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        CaptureFrame::new(w, h, pixels)
    }

    #[test]
    fn spatial_tick_places_and_freezes() {
        let mut driver = FrameDriver::new(0.0);
        let mut placement = PlacementController::new(Box::new(HitTestProvider::new()));
        let mut scene = scene();
        let t0 = Instant::now();

        driver.tick(
            TickInput {
                now: t0,
                xr_frame: Some(XrFrame {
                    viewer: XrPose::at(0.0, 1.6, 0.0),
                    hit: Some(XrPose::at(0.4, 0.0, -1.0)),
                    select: false,
                }),
                camera_frame: None,
                dragging: false,
            },
            &mut placement,
            &mut scene,
        );

        // Searching: reticle visible on the candidate, dish hidden.
        assert!(scene.reticle.visible);
        assert!(!scene.model.visible);

        driver.tick(
            TickInput {
                now: t0 + Duration::from_millis(16),
                xr_frame: Some(XrFrame {
                    viewer: XrPose::at(0.0, 1.6, 0.0),
                    hit: Some(XrPose::at(0.4, 0.0, -1.0)),
                    select: true,
                }),
                camera_frame: None,
                dragging: false,
            },
            &mut placement,
            &mut scene,
        );

        assert!(scene.model.visible);
        assert!(!scene.reticle.visible);
        assert_eq!(scene.model.anchor_pose.w.x, 0.4);
    }

    #[test]
    fn heuristic_tick_spins_when_idle_but_not_mid_drag() {
        let config = HeuristicConfig {
            debounce_frames: 1,
            sample_interval: Duration::from_millis(0),
            ..HeuristicConfig::default()
        };
        let mut driver = FrameDriver::new(90.0);
        let mut placement =
            PlacementController::new(Box::new(MarkerHeuristicProvider::new(config)));
        let mut scene = scene();
        let frame = surface_frame();
        let t0 = Instant::now();

        driver.tick(
            TickInput {
                now: t0,
                xr_frame: None,
                camera_frame: Some(&frame),
                dragging: false,
            },
            &mut placement,
            &mut scene,
        );
        assert!(scene.model.visible);
        let yaw_after_detect = scene.model.yaw;

        driver.tick(
            TickInput {
                now: t0 + Duration::from_secs(1),
                xr_frame: None,
                camera_frame: Some(&frame),
                dragging: false,
            },
            &mut placement,
            &mut scene,
        );
        let spun = scene.model.yaw.0 - yaw_after_detect.0;
        assert!((spun - 90f32.to_radians()).abs() < 1e-3);

        // Mid-gesture: no idle spin.
        let yaw_before = scene.model.yaw;
        driver.tick(
            TickInput {
                now: t0 + Duration::from_secs(2),
                xr_frame: None,
                camera_frame: Some(&frame),
                dragging: true,
            },
            &mut placement,
            &mut scene,
        );
        assert_eq!(scene.model.yaw, yaw_before);
    }

    #[test]
    fn first_tick_has_zero_animation_delta() {
        let mut driver = FrameDriver::new(0.0);
        let mut placement = PlacementController::new(Box::new(HitTestProvider::new()));
        let mut scene = scene();
        scene.model.mixer = crate::gfx::animation::AnimationMixer::new(vec![
            crate::gfx::animation::ClipSpec::Spin {
                degrees_per_second: 360.0,
            },
        ]);

        driver.tick(
            TickInput {
                now: Instant::now(),
                xr_frame: None,
                camera_frame: None,
                dragging: false,
            },
            &mut placement,
            &mut scene,
        );
        assert_eq!(scene.model.mixer.yaw_offset().0, 0.0);
    }
}
