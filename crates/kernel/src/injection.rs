//! Ships displace the water they sit in.
//!
//! Every frame, each cell within a small radius of a ship is raised by a fixed bump. This happens
//! *before* the stencil update so that the integrator computes its neighbour differences from the
//! already-disturbed surface. It is not physically rigorous, but it is what the visuals were tuned
//! against.

/// The height added to a cell for every ship within range.
pub const BUMP: f32 = 0.01;

/// The injection radius as a fraction of the domain width.
pub const RADIUS_FRACTION: f32 = 0.01;

/// Constants for an injection pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Zeroable, bytemuck::Pod)]
pub struct InjectionConstants {
    /// Grid spacing along x, in world units.
    pub dx: f32,
    /// Grid spacing along y, in world units.
    pub dy: f32,
    /// Cells whose centres are closer than this to a ship get bumped. World units.
    pub radius: f32,
    /// The height added per ship.
    pub bump: f32,
}

/// The total height to add to the cell at `(x, y)`. Ship positions are in world units.
#[must_use]
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    reason = "Grid coordinates are far smaller than `f32`'s integer precision"
)]
pub fn kernel(x: u32, y: u32, constants: &InjectionConstants, ships: &[glam::Vec2]) -> f32 {
    let centre = glam::Vec2::new(
        (x as f32 + 0.5) * constants.dx,
        (y as f32 + 0.5) * constants.dy,
    );

    ships
        .iter()
        .filter(|ship| centre.distance(**ship) < constants.radius)
        .map(|_| constants.bump)
        .sum()
}
