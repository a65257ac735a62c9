//! Turns heights into colour.
//!
//! The water colour is a straight linear ramp between two fixed colours. The interpolation
//! fraction isn't clamped, so heights outside the ramp's range extrapolate past its endpoints.
//! Underneath the water is a static background which is refracted by sampling it at an offset
//! proportional to the local height gradient.

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles as _};

use crate::grid::Dimensions;

/// The colour of water at the bottom of the ramp.
pub const COLOUR_MIN: Vec4 = Vec4::new(0.0, 0.25, 1.0, 1.0);

/// The colour of water at the top of the ramp.
pub const COLOUR_MAX: Vec4 = Vec4::new(0.25, 1.0, 1.0, 1.0);

/// Barycentric weights may be this far below zero and still count as inside a triangle, so that
/// pixels on the shared diagonal of a quad aren't dropped.
const EDGE_TOLERANCE: f32 = 1e-5;

/// Constants for the diffuse pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Zeroable, bytemuck::Pod)]
pub struct CompositorConstants {
    /// The shape of the grid, and therefore of the output.
    pub dimensions: Dimensions,
    /// The height that maps to [`COLOUR_MIN`].
    pub colour_min_height: f32,
    /// The height that maps to [`COLOUR_MAX`].
    pub colour_max_height: f32,
    /// How far, in UV units per unit of height difference, the background is displaced.
    pub refraction_strength: f32,
    /// How much of the water colour covers the refracted background. `0` is clear water.
    pub water_opacity: f32,
}

/// Map a height onto the colour ramp. Deliberately unclamped.
#[must_use]
pub fn ramp(height: f32, constants: &CompositorConstants) -> Vec4 {
    let fraction = (height - constants.colour_min_height)
        / (constants.colour_max_height - constants.colour_min_height);
    COLOUR_MIN.lerp(COLOUR_MAX, fraction)
}

/// Nearest-neighbour lookup into a texture. UVs outside `[0, 1]` are edge-clamped.
#[must_use]
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    reason = "Texture dimensions are far smaller than `f32`'s integer precision"
)]
pub fn sample(texture: &[Vec4], dimensions: Dimensions, uv: Vec2) -> Vec4 {
    texture[dimensions.sample_index(
        uv.x * dimensions.width as f32,
        uv.y * dimensions.height as f32,
    )]
}

/// The colour of the water at `(x, y)`, before sprites and lighting.
#[must_use]
#[expect(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    reason = "Grid dimensions are validated to fit in an `i32`"
)]
pub fn diffuse(
    x: u32,
    y: u32,
    constants: &CompositorConstants,
    heights: &[f32],
    background: &[Vec4],
    background_dimensions: Dimensions,
) -> Vec4 {
    let dimensions = constants.dimensions;
    let (signed_x, signed_y) = (x as i32, y as i32);

    let height = heights[dimensions.index(x, y)];
    let height_x_plus = heights[dimensions.clamped_index(signed_x + 1, signed_y)];
    let height_y_plus = heights[dimensions.clamped_index(signed_x, signed_y + 1)];
    let gradient = Vec2::new(height_x_plus - height, height_y_plus - height);

    let uv = Vec2::new(
        (x as f32 + 0.5) / dimensions.width as f32,
        (y as f32 + 0.5) / dimensions.height as f32,
    );
    let refracted = sample(
        background,
        background_dimensions,
        uv + gradient * constants.refraction_strength,
    );

    refracted.lerp(ramp(height, constants), constants.water_opacity)
}

/// Standard "source-over" blending.
#[must_use]
pub fn blend_over(source: Vec4, destination: Vec4) -> Vec4 {
    let alpha = source.w;
    let colour = source.xyz() * alpha + destination.xyz() * (1.0 - alpha);
    colour.extend(alpha + destination.w * (1.0 - alpha))
}

/// Barycentric weights of `point` in the triangle `a, b, c`, or `None` if it's outside, or if the
/// triangle is degenerate.
#[must_use]
pub fn barycentric(point: Vec2, a: Vec2, b: Vec2, c: Vec2) -> Option<Vec3> {
    let edge_ab = b - a;
    let edge_ac = c - a;
    let to_point = point - a;

    let area = edge_ab.perp_dot(edge_ac);
    if area.abs() <= f32::EPSILON {
        return None;
    }

    let weight_b = to_point.perp_dot(edge_ac) / area;
    let weight_c = edge_ab.perp_dot(to_point) / area;
    let weights = Vec3::new(1.0 - weight_b - weight_c, weight_b, weight_c);

    (weights.min_element() >= -EDGE_TOLERANCE).then_some(weights)
}

/// The sprite UV under `pixel`, if any. The quad is split into the triangles `(0, 1, 2)` and
/// `(0, 2, 3)` and UVs are interpolated affinely across each.
#[must_use]
pub fn sprite_uv(pixel: Vec2, corners: &[Vec2; 4], uvs: &[Vec2; 4]) -> Option<Vec2> {
    for [first, second, third] in [[0, 1, 2], [0, 2, 3]] {
        if let Some(weights) = barycentric(
            pixel,
            corners[first],
            corners[second],
            corners[third],
        ) {
            return Some(uvs[first] * weights.x + uvs[second] * weights.y + uvs[third] * weights.z);
        }
    }

    None
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pose::CORNER_UVS;

    fn constants() -> CompositorConstants {
        CompositorConstants {
            dimensions: Dimensions::new(2, 2),
            colour_min_height: 0.0,
            colour_max_height: 2.0,
            refraction_strength: 0.0,
            water_opacity: 1.0,
        }
    }

    fn square() -> [Vec2; 4] {
        [
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ]
    }

    #[test]
    fn ramp_hits_its_endpoints() {
        assert!(ramp(0.0, &constants()).abs_diff_eq(COLOUR_MIN, 1e-6));
        assert!(ramp(2.0, &constants()).abs_diff_eq(COLOUR_MAX, 1e-6));
        assert!(ramp(1.0, &constants()).abs_diff_eq(Vec4::new(0.125, 0.625, 1.0, 1.0), 1e-6));
    }

    #[test]
    fn ramp_extrapolates_beyond_its_range() {
        let colour = ramp(-2.0, &constants());
        assert!(colour.abs_diff_eq(Vec4::new(-0.25, -0.5, 1.0, 1.0), 1e-6));
    }

    #[test]
    fn refraction_shifts_the_background_lookup() {
        #[rustfmt::skip]
        let background = [
            Vec4::X, Vec4::Y,
            Vec4::Z, Vec4::W,
        ];
        #[rustfmt::skip]
        let heights = [
            0.0, 1.0,
            0.0, 1.0,
        ];
        let clear = CompositorConstants {
            refraction_strength: 0.0,
            water_opacity: 0.0,
            ..constants()
        };
        let dimensions = clear.dimensions;
        assert_eq!(diffuse(0, 0, &clear, &heights, &background, dimensions), Vec4::X);

        // The height rises towards +x, so the lookup is pushed one pixel right.
        let refracting = CompositorConstants {
            refraction_strength: 0.5,
            ..clear
        };
        assert_eq!(diffuse(0, 0, &refracting, &heights, &background, dimensions), Vec4::Y);
    }

    #[test]
    fn opaque_source_replaces_the_destination() {
        let source = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let destination = Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(blend_over(source, destination), source);
    }

    #[test]
    fn transparent_source_keeps_the_destination() {
        let source = Vec4::new(1.0, 0.0, 0.0, 0.0);
        let destination = Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(blend_over(source, destination), destination);
    }

    #[test]
    fn half_transparent_source_mixes() {
        let source = Vec4::new(1.0, 0.0, 0.0, 0.5);
        let destination = Vec4::new(0.0, 0.0, 1.0, 1.0);
        let blended = blend_over(source, destination);
        assert!(blended.abs_diff_eq(Vec4::new(0.5, 0.0, 0.5, 1.0), 1e-6));
    }

    #[test]
    fn interpolates_uvs_inside_the_quad() {
        let uv = sprite_uv(Vec2::new(3.0, 1.0), &square(), &CORNER_UVS);
        assert!(uv.is_some_and(|uv| uv.abs_diff_eq(Vec2::new(0.75, 0.25), 1e-6)));

        let uv = sprite_uv(Vec2::new(1.0, 3.0), &square(), &CORNER_UVS);
        assert!(uv.is_some_and(|uv| uv.abs_diff_eq(Vec2::new(0.25, 0.75), 1e-6)));
    }

    #[test]
    fn pixels_outside_the_quad_have_no_uv() {
        assert_eq!(sprite_uv(Vec2::new(5.0, 5.0), &square(), &CORNER_UVS), None);
        assert_eq!(sprite_uv(Vec2::new(-0.5, 2.0), &square(), &CORNER_UVS), None);
    }

    #[test]
    fn degenerate_quads_cover_nothing() {
        let collapsed = [Vec2::ZERO; 4];
        assert_eq!(sprite_uv(Vec2::ZERO, &collapsed, &CORNER_UVS), None);
    }
}
