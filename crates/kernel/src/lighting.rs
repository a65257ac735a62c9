//! Point lights, with shadows cast by the water surface and by the ships on it.
//!
//! For every pixel, and for every light, we march from the light towards the pixel in equal steps
//! of at most one cell along the major axis. If the surface is ever higher than the ray then the
//! pixel is in shadow for that light. Otherwise the light falls off quadratically with distance:
//!
//!   attenuation = ((max_distance - distance) / max_distance)²
//!
//! All positions here are in grid units: `x` and `y` are cell coordinates, `z` is a plain height.

use glam::{Vec3, Vec4, Vec4Swizzles as _};

use crate::grid::Dimensions;

/// The colour of a light's marker, when they're shown.
pub const MARKER_COLOUR: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

/// A point light.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Zeroable, bytemuck::Pod)]
pub struct LightSource {
    /// Position along x, in cells.
    pub x: f32,
    /// Position along y, in cells.
    pub y: f32,
    /// Height above the zero level of the water.
    pub height: f32,
}

impl LightSource {
    /// The light's position as a vector.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.height)
    }
}

/// Constants for the lighting pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Zeroable, bytemuck::Pod)]
pub struct LightingConstants {
    /// The shape of the grid, and therefore of the output.
    pub dimensions: Dimensions,
    /// The most samples taken along any one ray.
    pub max_steps: u32,
    /// Lights can't reach further than this. Also the distance recorded for an occluded ray.
    pub max_travel_distance: f32,
    /// The least light any pixel receives.
    pub ambient: f32,
    /// Pixels closer than this to a light are painted with [`MARKER_COLOUR`].
    pub marker_radius: f32,
    /// Whether to paint light markers at all. `0` is off, anything else is on.
    pub show_markers: u32,
}

/// How much of a single light reaches `target`, in `[0, 1]`.
#[must_use]
#[expect(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    reason = "The step count is bounded by the grid size"
)]
pub fn attenuation(
    source: Vec3,
    target: Vec3,
    surface: &[f32],
    constants: &LightingConstants,
) -> f32 {
    let max_distance = constants.max_travel_distance;
    let direction = target - source;
    let mut distance = direction.length();

    let major_axis = direction.x.abs().max(direction.y.abs());
    let cells = major_axis as u32;
    let steps = cells.min(constants.max_steps);
    if steps > 0 {
        // Capped rays spread their samples over the whole ray, otherwise one sample per cell.
        let spacing = if steps < cells {
            steps as f32
        } else {
            major_axis
        };
        let delta = direction / spacing;
        for step in 0..steps {
            let waypoint = source + delta * step as f32;
            let index = constants.dimensions.sample_index(waypoint.x, waypoint.y);
            if surface[index] > waypoint.z {
                distance = max_distance;
                break;
            }
        }
    }

    let remaining = (max_distance - distance.min(max_distance)) / max_distance;
    remaining * remaining
}

/// The final colour of the pixel at `(x, y)`.
#[must_use]
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    reason = "Grid coordinates are far smaller than `f32`'s integer precision"
)]
pub fn kernel(
    x: u32,
    y: u32,
    constants: &LightingConstants,
    lights: &[LightSource],
    surface: &[f32],
    diffuse: Vec4,
) -> Vec4 {
    let index = constants.dimensions.index(x, y);
    let target = Vec3::new(x as f32, y as f32, surface[index]);

    if constants.show_markers != 0 {
        let is_marker = lights.iter().any(|light| {
            target.truncate().distance(light.position().truncate()) < constants.marker_radius
        });
        if is_marker {
            return MARKER_COLOUR;
        }
    }

    let lightness: f32 = lights
        .iter()
        .map(|light| attenuation(light.position(), target, surface, constants))
        .sum();

    (diffuse.xyz() * lightness.max(constants.ambient)).extend(1.0)
}

#[expect(clippy::float_cmp, reason = "They're just tests")]
#[cfg(test)]
mod test {
    use super::*;

    fn constants(dimensions: Dimensions, max_travel_distance: f32) -> LightingConstants {
        LightingConstants {
            dimensions,
            max_steps: dimensions.width.max(dimensions.height),
            max_travel_distance,
            ambient: 0.0,
            marker_radius: 0.0,
            show_markers: 0,
        }
    }

    fn lightness_map(
        constants: &LightingConstants,
        lights: &[LightSource],
        surface: &[f32],
    ) -> Vec<f32> {
        (0..constants.dimensions.cell_count())
            .map(|index| {
                let (x, y) = constants.dimensions.coordinates(index);
                kernel(x, y, constants, lights, surface, Vec4::ONE).x
            })
            .collect()
    }

    /// `#` for any light at all, `.` for total darkness.
    fn shadow_map(width: u32, lightness: &[f32]) -> Vec<String> {
        lightness
            .chunks(width.try_into().unwrap())
            .map(|row| {
                row.iter()
                    .map(|value| if *value > 0.0 { "#" } else { "." })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    #[test]
    fn no_lights_is_total_darkness() {
        let dimensions = Dimensions::new(4, 4);
        let surface = vec![0.0; dimensions.cell_count()];
        let lightness = lightness_map(&constants(dimensions, 4.0), &[], &surface);
        assert!(lightness.iter().all(|value| *value == 0.0));
    }

    #[test]
    fn ambient_light_is_a_floor() {
        let dimensions = Dimensions::new(4, 4);
        let surface = vec![0.0; dimensions.cell_count()];
        let constants = LightingConstants {
            ambient: 0.25,
            ..constants(dimensions, 4.0)
        };
        let lightness = lightness_map(&constants, &[], &surface);
        assert!(lightness.iter().all(|value| *value == 0.25));
    }

    #[test]
    fn light_directly_above_is_brightest() {
        let dimensions = Dimensions::new(5, 5);
        let surface = vec![0.0; dimensions.cell_count()];
        let light = LightSource {
            x: 2.0,
            y: 2.0,
            height: 1.0,
        };
        let lightness = lightness_map(&constants(dimensions, 5.0), &[light], &surface);

        let centre = lightness[dimensions.index(2, 2)];
        assert!((centre - 0.64).abs() < 1e-6);
        assert!(lightness.iter().all(|value| *value <= centre));
    }

    #[test]
    fn light_fades_to_nothing_at_its_range() {
        let dimensions = Dimensions::new(10, 1);
        let surface = vec![0.0; dimensions.cell_count()];
        let light = LightSource {
            x: 0.0,
            y: 0.0,
            height: 0.0,
        };
        let lightness = lightness_map(&constants(dimensions, 4.0), &[light], &surface);
        assert!((lightness[2] - 0.25).abs() < 1e-6);
        assert!(lightness[4..].iter().all(|value| *value == 0.0));
    }

    #[test]
    fn wall_casts_a_shadow() {
        let dimensions = Dimensions::new(9, 9);
        let mut surface = vec![0.0; dimensions.cell_count()];
        for y in 2..=6 {
            surface[dimensions.index(4, y)] = 1.0;
        }
        let light = LightSource {
            x: 1.0,
            y: 4.0,
            height: 1.5,
        };
        let lightness = lightness_map(&constants(dimensions, 9.0), &[light], &surface);

        #[rustfmt::skip]
        assert_eq!(
            shadow_map(dimensions.width, &lightness),
            [
                "# # # # # # # . .",
                "# # # # # # . . .",
                "# # # # # . . . .",
                "# # # # # . . . .",
                "# # # # # . . . .",
                "# # # # # . . . .",
                "# # # # # . . . .",
                "# # # # # . . . .",
                "# # # # # # . . .",
            ]
        );
    }

    #[test]
    fn capped_rays_still_reach_walls_near_the_target() {
        let dimensions = Dimensions::new(20, 1);
        let mut surface = vec![0.0; dimensions.cell_count()];
        for x in 14..=18 {
            surface[dimensions.index(x, 0)] = 5.0;
        }
        let constants = LightingConstants {
            max_steps: 5,
            ..constants(dimensions, 40.0)
        };

        let behind_the_wall = attenuation(
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(19.0, 0.0, 0.0),
            &surface,
            &constants,
        );
        assert_eq!(behind_the_wall, 0.0);

        let before_the_wall = attenuation(
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(10.0, 0.0, 0.0),
            &surface,
            &constants,
        );
        assert!(before_the_wall > 0.0);
    }

    #[test]
    fn lights_are_plain_bytes() {
        let light = LightSource {
            x: 1.0,
            y: 2.0,
            height: 3.0,
        };
        let bytes = bytemuck::bytes_of(&light);
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytemuck::pod_read_unaligned::<LightSource>(bytes), light);
    }

    #[test]
    fn lights_add_up() {
        let dimensions = Dimensions::new(3, 1);
        let surface = vec![0.0; dimensions.cell_count()];
        let light = LightSource {
            x: 1.0,
            y: 0.0,
            height: 1.0,
        };
        let one = lightness_map(&constants(dimensions, 2.0), &[light], &surface);
        let two = lightness_map(&constants(dimensions, 2.0), &[light, light], &surface);
        assert!((two[1] - one[1] * 2.0).abs() < 1e-6);
    }

    #[test]
    fn markers_paint_over_the_light() {
        let dimensions = Dimensions::new(5, 5);
        let surface = vec![0.0; dimensions.cell_count()];
        let light = LightSource {
            x: 2.0,
            y: 2.0,
            height: 1.0,
        };
        let constants = LightingConstants {
            marker_radius: 1.0,
            show_markers: 1,
            ..constants(dimensions, 5.0)
        };
        assert_eq!(
            kernel(2, 2, &constants, &[light], &surface, Vec4::ONE),
            MARKER_COLOUR
        );
        assert_ne!(
            kernel(0, 0, &constants, &[light], &surface, Vec4::ONE),
            MARKER_COLOUR
        );
    }
}
