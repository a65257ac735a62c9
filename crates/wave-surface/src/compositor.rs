//! Colours the water, then draws the ships on top of it.

use glam::{Vec2, Vec4};
use wave_surface_kernel::{
    compositor::{CompositorConstants, blend_over, sample, sprite_uv},
    grid::Dimensions,
    pose::{CORNER_UVS, Pose, project_quad},
};

use crate::{config::SimulationConfig, executor::Executor, texture::Texture};

/// Produces the unlit colour of every pixel.
#[derive(Clone, Debug)]
pub struct Compositor {
    /// Constants for the diffuse kernel.
    constants: CompositorConstants,
    /// Seen through the water.
    background: Texture,
    /// Drawn for every ship.
    sprite: Texture,
    /// Height above the water of a fully opaque sprite pixel.
    hull_height: f32,
    /// Scratch: whether any sprite covers each pixel.
    covered: Vec<bool>,
}

/// What drawing the ships produced, besides colour.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SpriteReport {
    /// Number of pixels covered by at least one sprite.
    pub covered_pixels: usize,
    /// Number of ships whose perspective divide had to be clamped.
    pub clamped_ships: usize,
}

impl Compositor {
    /// Instantiate.
    #[must_use]
    pub fn new(config: &SimulationConfig, background: Texture, sprite: Texture) -> Self {
        Self {
            constants: CompositorConstants {
                dimensions: config.dimensions(),
                colour_min_height: config.render.colour_min_height,
                colour_max_height: config.render.colour_max_height,
                refraction_strength: config.render.refraction_strength,
                water_opacity: config.render.water_opacity,
            },
            background,
            sprite,
            hull_height: config.render.hull_height,
            covered: vec![false; config.dimensions().cell_count()],
        }
    }

    /// The shape of the output.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.constants.dimensions
    }

    /// Colour every pixel according to the water height, refracting the background.
    pub fn diffuse(&self, executor: &Executor, heights: &[f32], output: &mut [Vec4]) {
        executor.for_each_cell(self.constants.dimensions, output, |x, y| {
            wave_surface_kernel::compositor::diffuse(
                x,
                y,
                &self.constants,
                heights,
                &self.background.pixels,
                self.background.dimensions,
            )
        });
    }

    /// Blend every ship's sprite over `output`, and record how tall the ships stand in
    /// `ship_heights`, which is reset first.
    #[expect(
        clippy::indexing_slicing,
        reason = "Pixel coordinates are clamped to the output before indexing"
    )]
    pub fn draw_sprites(
        &mut self,
        poses: &[Pose],
        output: &mut [Vec4],
        ship_heights: &mut [f32],
    ) -> SpriteReport {
        let dimensions = self.constants.dimensions;
        ship_heights.fill(0.0);

        let mut report = SpriteReport::default();
        self.covered.fill(false);

        for pose in poses {
            let projected = project_quad(pose);
            if projected.clamped {
                tracing::warn!("Clamped the perspective divide of a ship at {}", pose.position);
                report.clamped_ships += 1;
            }

            let display = display_size(dimensions);
            let corners = projected.corners.map(|corner| corner * display);
            let Some((min, max)) = bounding_box(&corners, dimensions) else {
                continue;
            };

            for y in min.1..=max.1 {
                for x in min.0..=max.0 {
                    let centre = pixel_centre(x, y);
                    let Some(uv) = sprite_uv(centre, &corners, &CORNER_UVS) else {
                        continue;
                    };

                    let colour = sample(&self.sprite.pixels, self.sprite.dimensions, uv);
                    if colour.w <= 0.0 {
                        continue;
                    }

                    let index = dimensions.index(x, y);
                    output[index] = blend_over(colour, output[index]);
                    ship_heights[index] = ship_heights[index].max(colour.w * self.hull_height);
                    self.covered[index] = true;
                }
            }
        }

        report.covered_pixels = self
            .covered
            .iter()
            .filter(|is_covered| **is_covered)
            .count();
        report
    }
}

/// The output's size in pixels, as a vector.
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    reason = "Grid dimensions are far smaller than `f32`'s integer precision"
)]
fn display_size(dimensions: Dimensions) -> Vec2 {
    Vec2::new(dimensions.width as f32, dimensions.height as f32)
}

/// The centre of a pixel in pixel coordinates.
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    reason = "Grid dimensions are far smaller than `f32`'s integer precision"
)]
fn pixel_centre(x: u32, y: u32) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}

/// The inclusive range of pixels that the quad might cover, or `None` if it's entirely off
/// screen.
#[expect(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    reason = "Values are clamped to the grid before casting"
)]
fn bounding_box(
    corners: &[Vec2; 4],
    dimensions: Dimensions,
) -> Option<((u32, u32), (u32, u32))> {
    let min = corners.iter().fold(Vec2::INFINITY, |acc, corner| acc.min(*corner));
    let max = corners.iter().fold(Vec2::NEG_INFINITY, |acc, corner| acc.max(*corner));
    let display = display_size(dimensions);

    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    if max.x < 0.0 || max.y < 0.0 || min.x >= display.x || min.y >= display.y {
        return None;
    }

    let last = display - Vec2::ONE;
    let min = min.floor().clamp(Vec2::ZERO, last);
    let max = max.floor().clamp(Vec2::ZERO, last);
    Some(((min.x as u32, min.y as u32), (max.x as u32, max.y as u32)))
}
