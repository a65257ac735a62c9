//! The scalar wave kernel. The canonical integrator.
//!
//! A leapfrog-style explicit discretisation of the 2D wave equation:
//!
//!   laplacian = (h_xp + h_xm + h_yp + h_ym - 4h) / (dx * dy)
//!   v'        = (v + dt * laplacian) * damping
//!   h'        = h + dt * v'
//!
//! The damping factor is the only energy sink. Note that the new height uses the *new* velocity,
//! which is what keeps the scheme stable for timesteps below the CFL limit.

use crate::cell::WaveCell;

/// Constants that don't change for the entirety of the simulation.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Zeroable, bytemuck::Pod)]
pub struct WaveConstants {
    /// The shape of the grid.
    pub dimensions: crate::grid::Dimensions,
    /// Grid spacing along x.
    pub dx: f32,
    /// Grid spacing along y.
    pub dy: f32,
    /// Timestep.
    pub dt: f32,
    /// Fixed per-step decay of the velocity, just under 1.
    pub damping: f32,
}

/// Advance the cell at `(x, y)` by one timestep, reading only from the previous buffer.
#[must_use]
#[expect(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    reason = "Grid dimensions are validated to fit in an `i32`"
)]
pub fn kernel(x: u32, y: u32, constants: &WaveConstants, previous: &[WaveCell]) -> WaveCell {
    let dimensions = constants.dimensions;
    let (signed_x, signed_y) = (x as i32, y as i32);

    let here = previous[dimensions.index(x, y)];
    let h_xp = previous[dimensions.clamped_index(signed_x + 1, signed_y)].height;
    let h_xm = previous[dimensions.clamped_index(signed_x - 1, signed_y)].height;
    let h_yp = previous[dimensions.clamped_index(signed_x, signed_y + 1)].height;
    let h_ym = previous[dimensions.clamped_index(signed_x, signed_y - 1)].height;

    let laplacian =
        (h_xp + h_xm + h_yp + h_ym - 4.0 * here.height) / (constants.dx * constants.dy);
    let velocity = (here.velocity + constants.dt * laplacian) * constants.damping;
    let height = here.height + constants.dt * velocity;

    WaveCell { height, velocity }
}
