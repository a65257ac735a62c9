//! Ships. They follow scripted paths, displace the water they sit in, and tilt and bob with it.

use glam::Vec2;
use wave_surface_kernel::pose::{HeightSamples, Pose, tilt};

use crate::integrator::Surface;

/// How a ship moves, frame by frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Motion {
    /// Doesn't move.
    Stationary,
    /// Sails anticlockwise around a circle, facing along it.
    Circle {
        /// Centre of the circle, world units.
        centre: Vec2,
        /// Radius of the circle, world units.
        radius: f32,
        /// Radians per frame.
        angular_speed: f32,
    },
}

/// A ship.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Agent {
    /// Position in world units.
    pub position: Vec2,
    /// Heading. Radians.
    pub yaw: f32,
    /// Side length of the sprite, as a fraction of the display.
    pub scale: f32,
    /// Scripted path.
    pub motion: Motion,
    /// Tilt along y, derived from the surface.
    pub pitch: f32,
    /// Tilt along x, derived from the surface.
    pub roll: f32,
    /// Surface height under the ship.
    pub vertical_offset: f32,
}

impl Agent {
    /// Instantiate a stationary ship, sitting level.
    #[must_use]
    pub const fn new(position: Vec2, yaw: f32, scale: f32) -> Self {
        Self {
            position,
            yaw,
            scale,
            motion: Motion::Stationary,
            pitch: 0.0,
            roll: 0.0,
            vertical_offset: 0.0,
        }
    }

    /// Give the ship a scripted path.
    #[must_use]
    pub const fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    /// Move the ship to where its path says it should be on `frame`.
    #[expect(
        clippy::as_conversions,
        clippy::cast_precision_loss,
        reason = "Only the fractional part of the angle matters after a few thousand frames"
    )]
    pub fn advance(&mut self, frame: u64) {
        match self.motion {
            Motion::Stationary => (),
            Motion::Circle {
                centre,
                radius,
                angular_speed,
            } => {
                let angle = angular_speed * frame as f32;
                self.position = centre + Vec2::from_angle(angle) * radius;
                self.yaw = angle + core::f32::consts::FRAC_PI_2;
            }
        }
    }

    /// Tilt and lift the ship according to the surface underneath it.
    pub fn derive_pose(&mut self, surface: &Surface, dx: f32, dy: f32, exaggeration: f32) {
        let samples: HeightSamples =
            surface.samples(self.position.x / dx, self.position.y / dy);
        let tilt = tilt(&samples, dx, dy, exaggeration);
        self.pitch = tilt.pitch;
        self.roll = tilt.roll;
        self.vertical_offset = samples.centre;
    }

    /// The ship's pose in normalised display coordinates.
    #[must_use]
    pub fn pose(&self, world_size: Vec2) -> Pose {
        Pose {
            position: self.position / world_size,
            yaw: self.yaw,
            pitch: self.pitch,
            roll: self.roll,
            scale: self.scale,
            vertical_offset: self.vertical_offset,
        }
    }
}

/// Two ships: one sailing around the middle of the domain, one anchored near the top-left and
/// facing the other way.
#[must_use]
pub fn default_roster(world_size: Vec2) -> Vec<Agent> {
    let scale = 0.1;
    let centre = world_size * 0.5;
    vec![
        Agent::new(centre, 0.0, scale).with_motion(Motion::Circle {
            centre,
            radius: world_size.min_element() * 0.2,
            angular_speed: 0.02,
        }),
        Agent::new(world_size * 0.25, core::f32::consts::PI, scale),
    ]
}
