//! Ships ride the surface: they tilt with the local slope and bob with the local height.
//!
//! The pose is then used to place the ship's sprite on screen. A flat unit quad is scaled, rotated
//! and lifted by the surface height, then perspective-divided by `1 - z`. Nothing stops a steep
//! enough tilt from pushing `z` to (or past) 1, so the divisor is clamped to
//! [`MIN_PERSPECTIVE_DIVISOR`] and the caller is told whenever that happens.

use glam::{Mat3, Vec2, Vec3};

use crate::{cell::Cell, grid::Dimensions};

/// Tilt angles are multiplied by this so that they're readable at the rendered scale.
pub const TILT_EXAGGERATION: f32 = 4.0;

/// The smallest value that the perspective divisor `1 - z` may take.
pub const MIN_PERSPECTIVE_DIVISOR: f32 = 0.1;

/// Texture coordinates of the quad's corners, in the same order as [`Projected::corners`].
pub const CORNER_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

/// The surface height under a ship and one grid spacing either side of it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HeightSamples {
    /// Directly underneath.
    pub centre: f32,
    /// One cell towards +x.
    pub x_plus: f32,
    /// One cell towards -x.
    pub x_minus: f32,
    /// One cell towards +y.
    pub y_plus: f32,
    /// One cell towards -y.
    pub y_minus: f32,
}

impl HeightSamples {
    /// Sample the field around a fractional grid position. Lookups off the grid are edge-clamped.
    #[must_use]
    pub fn gather<C: Cell>(cells: &[C], dimensions: Dimensions, x: f32, y: f32) -> Self {
        let height = |sample_x: f32, sample_y: f32| {
            cells[dimensions.sample_index(sample_x, sample_y)].height()
        };

        Self {
            centre: height(x, y),
            x_plus: height(x + 1.0, y),
            x_minus: height(x - 1.0, y),
            y_plus: height(x, y + 1.0),
            y_minus: height(x, y - 1.0),
        }
    }
}

/// Rotation derived from the surface slope. Radians.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Tilt {
    /// Rotation about the x axis, following the slope along y.
    pub pitch: f32,
    /// Rotation about the y axis, following the slope along x.
    pub roll: f32,
}

/// Derive the tilt from the average of the forward and backward slopes in each axis.
#[must_use]
pub fn tilt(samples: &HeightSamples, dx: f32, dy: f32, exaggeration: f32) -> Tilt {
    let forward_x = (samples.x_plus - samples.centre) / dx;
    let backward_x = (samples.centre - samples.x_minus) / dx;
    let forward_y = (samples.y_plus - samples.centre) / dy;
    let backward_y = (samples.centre - samples.y_minus) / dy;

    let average_x = (forward_x + backward_x) * 0.5;
    let average_y = (forward_y + backward_y) * 0.5;

    Tilt {
        pitch: libm::atanf(average_y) * exaggeration,
        roll: libm::atanf(average_x) * exaggeration,
    }
}

/// Everything needed to place a ship's sprite on screen.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Pose {
    /// Position in normalised display coordinates, `[0, 1]` on both axes.
    pub position: Vec2,
    /// Heading. Radians.
    pub yaw: f32,
    /// See [`Tilt::pitch`].
    pub pitch: f32,
    /// See [`Tilt::roll`].
    pub roll: f32,
    /// Side length of the sprite in normalised display coordinates.
    pub scale: f32,
    /// How far the surface has lifted the ship. Added to the rotated `z`.
    pub vertical_offset: f32,
}

/// The sprite's screen-space quad.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Projected {
    /// Corners in normalised display coordinates. Their UVs are [`CORNER_UVS`].
    pub corners: [Vec2; 4],
    /// Whether any corner needed its perspective divisor clamping.
    pub clamped: bool,
}

/// Scale, rotate, lift, perspective-divide and finally translate the sprite's quad.
#[must_use]
pub fn project_quad(pose: &Pose) -> Projected {
    let rotation = Mat3::from_rotation_z(pose.yaw)
        * Mat3::from_rotation_x(pose.pitch)
        * Mat3::from_rotation_y(pose.roll);

    let mut clamped = false;
    let corners = CORNER_UVS.map(|uv| {
        let local = Vec3::new(uv.x - 0.5, uv.y - 0.5, 0.0) * pose.scale;
        let mut rotated = rotation * local;
        rotated.z += pose.vertical_offset;

        let mut divisor = 1.0 - rotated.z;
        if divisor < MIN_PERSPECTIVE_DIVISOR {
            divisor = MIN_PERSPECTIVE_DIVISOR;
            clamped = true;
        }

        rotated.truncate() / divisor + pose.position
    });

    Projected { corners, clamped }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cell::WaveCell;

    fn assert_close(left: Vec2, right: Vec2) {
        assert!(left.abs_diff_eq(right, 1e-5), "{left} != {right}");
    }

    #[expect(
        clippy::as_conversions,
        clippy::cast_precision_loss,
        reason = "Small test grids"
    )]
    fn ramp(dimensions: Dimensions, slope: f32) -> Vec<WaveCell> {
        (0..dimensions.cell_count())
            .map(|index| {
                let (x, _) = dimensions.coordinates(index);
                WaveCell {
                    height: x as f32 * slope,
                    velocity: 0.0,
                }
            })
            .collect()
    }

    fn flat_pose() -> Pose {
        Pose {
            position: Vec2::new(0.5, 0.5),
            scale: 0.2,
            ..Default::default()
        }
    }

    #[test]
    fn rising_ramp_rolls_positively() {
        let dimensions = Dimensions::new(8, 8);
        let cells = ramp(dimensions, 1.0);
        let samples = HeightSamples::gather(&cells, dimensions, 3.5, 4.5);
        let tilt = tilt(&samples, 1.0, 1.0, 1.0);
        assert!((tilt.roll - core::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert!(tilt.pitch.abs() < 1e-6);
    }

    #[test]
    fn falling_ramp_rolls_negatively() {
        let dimensions = Dimensions::new(8, 8);
        let cells = ramp(dimensions, -0.5);
        let samples = HeightSamples::gather(&cells, dimensions, 5.0, 1.0);
        let tilt = tilt(&samples, 1.0, 1.0, TILT_EXAGGERATION);
        assert!(tilt.roll < 0.0);
        assert!(tilt.pitch.abs() < 1e-6);
    }

    #[test]
    fn flat_quad_is_centred_on_its_position() {
        let projected = project_quad(&flat_pose());
        assert!(!projected.clamped);
        assert_close(projected.corners[0], Vec2::new(0.4, 0.4));
        assert_close(projected.corners[1], Vec2::new(0.6, 0.4));
        assert_close(projected.corners[2], Vec2::new(0.6, 0.6));
        assert_close(projected.corners[3], Vec2::new(0.4, 0.6));
    }

    #[test]
    fn yaw_turns_the_quad() {
        let pose = Pose {
            yaw: core::f32::consts::FRAC_PI_2,
            ..flat_pose()
        };
        let projected = project_quad(&pose);
        // A quarter turn moves the top-left corner to where the top-right was.
        assert_close(projected.corners[0], Vec2::new(0.6, 0.4));
    }

    #[test]
    fn lifted_quad_looks_bigger() {
        let pose = Pose {
            vertical_offset: 0.5,
            ..flat_pose()
        };
        let projected = project_quad(&pose);
        assert!(!projected.clamped);
        assert_close(projected.corners[0], Vec2::new(0.3, 0.3));
        assert_close(projected.corners[2], Vec2::new(0.7, 0.7));
    }

    #[test]
    fn divisor_is_clamped_near_the_singularity() {
        let pose = Pose {
            vertical_offset: 1.0,
            ..flat_pose()
        };
        let projected = project_quad(&pose);
        assert!(projected.clamped);
        assert!(projected.corners.iter().all(|corner| corner.is_finite()));
        assert_close(projected.corners[0], Vec2::new(-0.5, -0.5));
    }
}
