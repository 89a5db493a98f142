//! Animation tracks
//!
//! OBJ files carry no animation, so authored assets declare their clips in
//! a JSON sidecar (`<asset>.anim.json`) that the resolver binds when
//! present. The mixer advances all bound clips by wall-clock delta each
//! render tick and exposes the combined pose offsets to the model.

use cgmath::Rad;
use serde::Deserialize;

/// One animation clip, as declared in a sidecar manifest.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClipSpec {
    /// Continuous rotation about the vertical axis.
    Spin { degrees_per_second: f32 },
    /// Sinusoidal vertical bob.
    Bob {
        amplitude: f32,
        period_seconds: f32,
    },
}

/// Sidecar manifest format: `{ "clips": [ ... ] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationManifest {
    pub clips: Vec<ClipSpec>,
}

impl AnimationManifest {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let manifest: AnimationManifest = serde_json::from_str(json)?;
        Ok(manifest)
    }
}

/// Advances bound clips and accumulates their pose contribution.
///
/// All bound clips auto-play; there is no per-clip start/stop.
#[derive(Debug, Clone, Default)]
pub struct AnimationMixer {
    clips: Vec<ClipSpec>,
    time: f32,
}

impl AnimationMixer {
    pub fn new(clips: Vec<ClipSpec>) -> Self {
        Self { clips, time: 0.0 }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Advance playback by `dt` seconds of wall-clock time.
    pub fn advance(&mut self, dt: f32) {
        if !self.clips.is_empty() {
            self.time += dt.max(0.0);
        }
    }

    /// Combined yaw contribution of all spin clips.
    pub fn yaw_offset(&self) -> Rad<f32> {
        let degrees: f32 = self
            .clips
            .iter()
            .map(|clip| match clip {
                ClipSpec::Spin { degrees_per_second } => degrees_per_second * self.time,
                ClipSpec::Bob { .. } => 0.0,
            })
            .sum();
        Rad(degrees.to_radians())
    }

    /// Combined vertical offset of all bob clips.
    pub fn height_offset(&self) -> f32 {
        self.clips
            .iter()
            .map(|clip| match clip {
                ClipSpec::Bob {
                    amplitude,
                    period_seconds,
                } => {
                    let period = period_seconds.max(f32::EPSILON);
                    amplitude * (self.time * std::f32::consts::TAU / period).sin()
                }
                ClipSpec::Spin { .. } => 0.0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_parses_clips() {
        let manifest = AnimationManifest::from_json(
            r#"{
                "clips": [
                    { "kind": "spin", "degrees_per_second": 45.0 },
                    { "kind": "bob", "amplitude": 0.02, "period_seconds": 2.0 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.clips.len(), 2);
        assert_eq!(
            manifest.clips[0],
            ClipSpec::Spin {
                degrees_per_second: 45.0
            }
        );
    }

    #[test]
    fn spin_accumulates_yaw() {
        let mut mixer = AnimationMixer::new(vec![ClipSpec::Spin {
            degrees_per_second: 90.0,
        }]);
        mixer.advance(2.0);
        assert!((mixer.yaw_offset().0 - std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn bob_oscillates_and_returns() {
        let mut mixer = AnimationMixer::new(vec![ClipSpec::Bob {
            amplitude: 0.05,
            period_seconds: 1.0,
        }]);
        mixer.advance(0.25);
        assert!((mixer.height_offset() - 0.05).abs() < 1e-5);
        mixer.advance(0.75);
        assert!(mixer.height_offset().abs() < 1e-5);
    }

    #[test]
    fn empty_mixer_is_inert() {
        let mut mixer = AnimationMixer::empty();
        mixer.advance(10.0);
        assert_eq!(mixer.yaw_offset().0, 0.0);
        assert_eq!(mixer.height_offset(), 0.0);
    }
}
