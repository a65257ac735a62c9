//! The simulated grid of heights and velocities, double buffered.
//!
//! Every step reads the whole of the current buffer and writes the whole of the next one, so a
//! stencil never sees a neighbour's new value. Swapping only flips an index: the buffers are
//! allocated once and never copied.

use wave_surface_kernel::{cell::Cell, grid::Dimensions};

/// Which of the two buffers to address. Relative to the field's current state, so the same
/// `BufferId` refers to a different slot after every swap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferId {
    /// The most recently completed step. Read from during a step.
    Current,
    /// Where the step in progress writes to.
    Next,
}

/// A double-buffered grid of cells.
#[derive(Clone, Debug)]
pub struct Field<C: Cell> {
    /// The shape of the grid.
    dimensions: Dimensions,
    /// Both buffers. Never reallocated.
    buffers: [Vec<C>; 2],
    /// Index into `buffers` of the current buffer.
    current: usize,
    /// How many times the buffers have been swapped.
    generation: u64,
}

#[expect(
    clippy::indexing_slicing,
    reason = "`current` is only ever 0 or 1 and cell coordinates are checked or clamped"
)]
impl<C: Cell> Field<C> {
    /// Instantiate a field at rest.
    #[must_use]
    pub fn new(dimensions: Dimensions) -> Self {
        let cells = vec![C::default(); dimensions.cell_count()];
        Self {
            dimensions,
            buffers: [cells.clone(), cells],
            current: 0,
            generation: 0,
        }
    }

    /// The shape of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// How many times the buffers have been swapped.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The physical slot behind a `BufferId`. Only useful for checking buffer identity.
    #[must_use]
    pub const fn slot(&self, buffer: BufferId) -> usize {
        match buffer {
            BufferId::Current => self.current,
            BufferId::Next => 1 - self.current,
        }
    }

    /// Read a whole buffer.
    #[must_use]
    pub fn read(&self, buffer: BufferId) -> &[C] {
        &self.buffers[self.slot(buffer)]
    }

    /// Write to a whole buffer.
    pub fn write(&mut self, buffer: BufferId) -> &mut [C] {
        let slot = self.slot(buffer);
        &mut self.buffers[slot]
    }

    /// Borrow the current buffer for reading and the next buffer for writing, at the same time.
    pub fn split(&mut self) -> (&[C], &mut [C]) {
        let [first, second] = &mut self.buffers;
        if self.current == 0 {
            (first.as_slice(), second.as_mut_slice())
        } else {
            (second.as_slice(), first.as_mut_slice())
        }
    }

    /// Make the next buffer the current one.
    pub const fn swap(&mut self) {
        self.current = 1 - self.current;
        self.generation += 1;
    }

    /// Raise or lower the current surface at a single cell. Coordinates are edge-clamped.
    pub fn perturb(&mut self, x: i32, y: i32, amount: f32) {
        let index = self.dimensions.clamped_index(x, y);
        self.write(BufferId::Current)[index].add_height(amount);
    }

    /// The current height at a cell. Coordinates are edge-clamped.
    #[must_use]
    pub fn height_at(&self, x: i32, y: i32) -> f32 {
        self.read(BufferId::Current)[self.dimensions.clamped_index(x, y)].height()
    }

    /// Copy the current heights into `heights`, which must be the size of the grid.
    pub fn fill_heights(&self, heights: &mut [f32]) {
        for (height, cell) in heights.iter_mut().zip(self.read(BufferId::Current)) {
            *height = cell.height();
        }
    }

    /// The current heights, row by row.
    #[must_use]
    pub fn heights(&self) -> Vec<f32> {
        self.read(BufferId::Current)
            .iter()
            .map(C::height)
            .collect()
    }

    /// `Σ h² + |velocity|²` over the current buffer. Accumulated in `f64` so that it's usable
    /// for comparisons over long runs.
    #[must_use]
    pub fn total_energy(&self) -> f64 {
        self.read(BufferId::Current)
            .iter()
            .map(|cell| f64::from(cell.energy()))
            .sum()
    }

    /// Whether every component of every current cell is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.first_non_finite(BufferId::Current).is_none()
    }

    /// The coordinates of the first cell, row by row, that isn't finite.
    #[must_use]
    pub fn first_non_finite(&self, buffer: BufferId) -> Option<(u32, u32)> {
        self.read(buffer)
            .iter()
            .position(|cell| !cell.is_finite())
            .map(|index| self.dimensions.coordinates(index))
    }

    /// Repair every cell in a buffer, see `Cell::repair`. Returns the number of cells changed.
    pub fn repair(&mut self, buffer: BufferId, limit: f32) -> usize {
        self.write(buffer)
            .iter_mut()
            .map(|cell| cell.repair(limit))
            .filter(|changed| *changed)
            .count()
    }
}

#[expect(clippy::float_cmp, reason = "They're just tests")]
#[cfg(test)]
mod test {
    use super::*;
    use wave_surface_kernel::cell::WaveCell;

    fn field() -> Field<WaveCell> {
        Field::new(Dimensions::new(3, 2))
    }

    #[test]
    fn starts_at_rest() {
        let field = field();
        assert_eq!(field.heights(), vec![0.0; 6]);
        assert_eq!(field.total_energy(), 0.0);
        assert!(field.is_finite());
    }

    #[test]
    fn swap_then_read_returns_what_was_written() {
        let mut field = field();
        let written: Vec<WaveCell> = (0..6u8)
            .map(|index| WaveCell {
                height: f32::from(index),
                velocity: -f32::from(index),
            })
            .collect();
        field.write(BufferId::Next).copy_from_slice(&written);
        field.swap();

        assert_eq!(field.read(BufferId::Current), written.as_slice());
        assert_eq!(field.generation(), 1);
    }

    #[test]
    fn swap_flips_slots_without_copying() {
        let mut field = field();
        let current = field.read(BufferId::Current).as_ptr();
        let next = field.read(BufferId::Next).as_ptr();
        assert_ne!(current, next);

        field.swap();
        assert_eq!(field.read(BufferId::Current).as_ptr(), next);
        assert_eq!(field.read(BufferId::Next).as_ptr(), current);
        assert_eq!(field.slot(BufferId::Current), 1);
    }

    #[test]
    fn split_reads_current_and_writes_next() {
        let mut field = field();
        field.perturb(1, 1, 2.0);
        field.swap();
        field.perturb(0, 0, 1.0);

        let current = field.read(BufferId::Current).as_ptr();
        let next = field.read(BufferId::Next).as_ptr();
        let (read, write) = field.split();
        assert_eq!(read.as_ptr(), current);
        assert_eq!(write.as_ptr(), next);
        assert_eq!(read[0].height, 1.0);
        assert_eq!(write[4].height, 2.0);
    }

    #[test]
    fn out_of_range_perturbations_land_on_the_edge() {
        let mut field = field();
        field.perturb(10, -3, 0.5);
        assert_eq!(field.height_at(2, 0), 0.5);
        assert_eq!(field.height_at(99, -99), 0.5);
        assert_eq!(field.total_energy(), 0.25);
    }

    #[test]
    fn finds_and_repairs_non_finite_cells() {
        let mut field = field();
        field.perturb(2, 1, f32::NAN);
        assert_eq!(field.first_non_finite(BufferId::Current), Some((2, 1)));
        assert!(!field.is_finite());

        assert_eq!(field.repair(BufferId::Current, 10.0), 1);
        assert!(field.is_finite());
        assert_eq!(field.height_at(2, 1), 0.0);
    }
}
