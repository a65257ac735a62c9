//! Lights the composited image, with shadows cast by the waves and by the ships.

use glam::Vec4;
use wave_surface_kernel::lighting::{LightSource, LightingConstants};

use crate::{config::SimulationConfig, executor::Executor};

/// Runs the lighting kernel.
#[derive(Copy, Clone, Debug)]
pub struct Lighting {
    /// Constants for the lighting kernel.
    constants: LightingConstants,
}

impl Lighting {
    /// Instantiate.
    #[must_use]
    #[expect(
        clippy::as_conversions,
        clippy::cast_precision_loss,
        reason = "Grid dimensions are far smaller than `f32`'s integer precision"
    )]
    pub fn new(config: &SimulationConfig) -> Self {
        let settings = config.lighting;
        let longest_side = config.longest_side();
        Self {
            constants: LightingConstants {
                dimensions: config.dimensions(),
                max_steps: settings.max_steps.unwrap_or(longest_side),
                max_travel_distance: settings
                    .max_travel_distance
                    .unwrap_or(longest_side as f32),
                ambient: settings.ambient,
                marker_radius: settings.marker_fraction * config.width as f32,
                show_markers: u32::from(settings.show_lights),
            },
        }
    }

    /// The kernel constants.
    #[must_use]
    pub const fn constants(&self) -> &LightingConstants {
        &self.constants
    }

    /// The surface that casts shadows: the water, plus the ships standing on it.
    pub fn combine_surfaces(water: &[f32], ships: &[f32], surface: &mut [f32]) {
        for ((combined, water_height), ship_height) in surface.iter_mut().zip(water).zip(ships) {
            *combined = water_height + ship_height;
        }
    }

    /// Light every pixel of `diffuse` and store the result in `output`.
    #[expect(clippy::indexing_slicing, reason = "Every buffer is the size of the grid")]
    pub fn light(
        &self,
        executor: &Executor,
        lights: &[LightSource],
        surface: &[f32],
        diffuse: &[Vec4],
        output: &mut [Vec4],
    ) {
        let dimensions = self.constants.dimensions;
        executor.for_each_cell(dimensions, output, |x, y| {
            wave_surface_kernel::lighting::kernel(
                x,
                y,
                &self.constants,
                lights,
                surface,
                diffuse[dimensions.index(x, y)],
            )
        });
    }
}
