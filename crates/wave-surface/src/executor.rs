//! Dispatches kernels over every cell (or pixel) of a grid.
//!
//! Kernels are pure functions of their coordinates and of buffers that nothing else is writing to,
//! so each worker only needs to own a disjoint set of output rows. Serial and parallel dispatch
//! therefore produce identical results.

use rayon::prelude::*;
use wave_surface_kernel::grid::Dimensions;

use crate::config::ComputeType;

/// Runs kernels.
#[derive(Copy, Clone, Debug)]
pub struct Executor {
    /// Where to run the kernels.
    method: ComputeType,
}

impl Executor {
    /// Instantiate.
    #[must_use]
    pub const fn new(method: ComputeType) -> Self {
        Self { method }
    }

    /// Where the kernels run.
    #[must_use]
    pub const fn method(&self) -> ComputeType {
        self.method
    }

    /// Call `kernel` for every cell, and store what it returns in `output`.
    pub fn for_each_cell<T, K>(&self, dimensions: Dimensions, output: &mut [T], kernel: K)
    where
        T: Send,
        K: Fn(u32, u32) -> T + Sync,
    {
        self.update_each_cell(dimensions, output, |x, y, cell| *cell = kernel(x, y));
    }

    /// Call `kernel` for every cell, giving it mutable access to that cell and only that cell.
    #[expect(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        reason = "Grid dimensions are validated to fit in an `i32`"
    )]
    pub fn update_each_cell<T, K>(&self, dimensions: Dimensions, buffer: &mut [T], kernel: K)
    where
        T: Send,
        K: Fn(u32, u32, &mut T) + Sync,
    {
        let width = dimensions.width as usize;
        let run_row = |(y, row): (usize, &mut [T])| {
            for (x, cell) in row.iter_mut().enumerate() {
                kernel(x as u32, y as u32, cell);
            }
        };

        match self.method {
            ComputeType::CPU => buffer.chunks_mut(width).enumerate().for_each(run_row),
            ComputeType::Parallel => buffer.par_chunks_mut(width).enumerate().for_each(run_row),
        }
    }
}
