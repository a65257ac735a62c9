//! Point lights hovering over the water.

use glam::Vec2;
use wave_surface_kernel::lighting::LightSource;

/// How a light moves, frame by frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LightPath {
    /// Doesn't move.
    Static,
    /// Sweeps back and forth along x: `x = origin + amplitude * sin(frame / period_frames)`.
    Oscillate {
        /// Furthest distance from the origin, world units.
        amplitude: f32,
        /// Frames per radian of the sweep.
        period_frames: f32,
    },
}

/// A light.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Light {
    /// Where the light's path is anchored, world units.
    pub origin: Vec2,
    /// Current position, world units.
    pub position: Vec2,
    /// Height above the zero level of the water.
    pub height: f32,
    /// Scripted path.
    pub path: LightPath,
}

impl Light {
    /// Instantiate a static light.
    #[must_use]
    pub const fn new(position: Vec2, height: f32) -> Self {
        Self {
            origin: position,
            position,
            height,
            path: LightPath::Static,
        }
    }

    /// Give the light a scripted path.
    #[must_use]
    pub const fn with_path(mut self, path: LightPath) -> Self {
        self.path = path;
        self
    }

    /// Move the light to where its path says it should be on `frame`.
    #[expect(
        clippy::as_conversions,
        clippy::cast_precision_loss,
        reason = "Only the fractional part of the angle matters after a few thousand frames"
    )]
    pub fn advance(&mut self, frame: u64) {
        match self.path {
            LightPath::Static => (),
            LightPath::Oscillate {
                amplitude,
                period_frames,
            } => {
                let offset = amplitude * (frame as f32 / period_frames).sin();
                self.position = self.origin + Vec2::new(offset, 0.0);
            }
        }
    }

    /// Convert to grid units for the lighting kernel.
    #[must_use]
    pub fn to_kernel(&self, dx: f32, dy: f32) -> LightSource {
        LightSource {
            x: self.position.x / dx,
            y: self.position.y / dy,
            height: self.height,
        }
    }
}

/// A single light sweeping across the middle of the domain, from edge to edge.
#[must_use]
pub fn default_lights(world_size: Vec2) -> Vec<Light> {
    vec![
        Light::new(world_size * 0.5, 2.5).with_path(LightPath::Oscillate {
            amplitude: world_size.x * 0.5,
            period_frames: 100.0,
        }),
    ]
}
