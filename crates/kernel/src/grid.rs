//! Grid geometry shared by the field and by every per-pixel buffer.
//!
//! A grid is a 1D array of 2D data, row by row, with `[0, 0]` at the top-left:
//!
//!    0  1  2  3
//!    4  5  6  7
//!    8  9  10 11
//!
//! Lookups outside `[0, width) × [0, height)` are redirected to the nearest edge cell. So the
//! boundary behaves like a mirror: waves reflect off the edges rather than radiating away.

/// The shape of the simulation grid. Output pixels map one-to-one onto cells.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Zeroable, bytemuck::Pod)]
pub struct Dimensions {
    /// Number of cells along x.
    pub width: u32,
    /// Number of cells along y.
    pub height: u32,
}

#[expect(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "
      Dimensions are validated at configuration time to be non-zero and small enough that every
      coordinate fits in an `i32`. Clamped coordinates are never negative.
    "
)]
impl Dimensions {
    /// Instantiate.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The total number of cells.
    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// The linear index of a cell that is known to be inside the grid.
    #[must_use]
    pub const fn index(self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize) + x as usize
    }

    /// The linear index of any coordinate, clamped to the nearest edge cell.
    #[must_use]
    pub fn clamped_index(self, x: i32, y: i32) -> usize {
        let clamped_x = x.clamp(0, self.width as i32 - 1) as u32;
        let clamped_y = y.clamp(0, self.height as i32 - 1) as u32;
        self.index(clamped_x, clamped_y)
    }

    /// The cell containing a fractional grid position. Positions are truncated towards negative
    /// infinity, like a texel fetch, before clamping.
    #[must_use]
    pub fn sample_index(self, x: f32, y: f32) -> usize {
        self.clamped_index(libm::floorf(x) as i32, libm::floorf(y) as i32)
    }

    /// Convert a linear index back into `(x, y)`.
    #[must_use]
    pub const fn coordinates(self, index: usize) -> (u32, u32) {
        let width = self.width as usize;
        ((index % width) as u32, (index / width) as u32)
    }
}
