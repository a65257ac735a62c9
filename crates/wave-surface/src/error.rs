//! Everything that can go wrong inside the simulation itself.

/// Simulation errors. Configuration errors are caught before the first frame, divergence is
/// caught at the end of the frame in which it happens.
#[derive(Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum SimulationError {
    /// The grid can't be empty, or so large that its coordinates overflow.
    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested number of cells along x.
        width: u32,
        /// Requested number of cells along y.
        height: u32,
    },
    /// A physical constant is `NaN` or infinite.
    #[error("`{name}` must be finite, got {value}")]
    NonFiniteParameter {
        /// Name of the parameter.
        name: &'static str,
        /// The offending value.
        value: f32,
    },
    /// A spacing, timestep or similar is zero or negative.
    #[error("`{name}` must be greater than zero, got {value}")]
    NonPositiveParameter {
        /// Name of the parameter.
        name: &'static str,
        /// The offending value.
        value: f32,
    },
    /// A parameter is outside its allowed range.
    #[error("`{name}` must be within {range}, got {value}")]
    OutOfRange {
        /// Name of the parameter.
        name: &'static str,
        /// The offending value.
        value: f32,
        /// A human readable description of the allowed range.
        range: &'static str,
    },
    /// The timestep is too large for the grid spacing and wave speed. The explicit schemes blow up
    /// when waves can travel further than a cell in a single step, and the shallow water scheme
    /// also when its shortest waves grow too much in a single step.
    #[error("Timestep {dt} exceeds the stability limit of {limit}")]
    UnstableTimestep {
        /// The requested timestep.
        dt: f32,
        /// The largest stable timestep for this configuration.
        limit: f32,
    },
    /// A cell's height or velocity stopped being finite.
    #[error("Simulation diverged on frame {frame} at cell ({x}, {y})")]
    Diverged {
        /// The frame on which it happened.
        frame: u64,
        /// The first non-finite cell along x.
        x: u32,
        /// The first non-finite cell along y.
        y: u32,
    },
    /// A texture doesn't have the shape it claims to have.
    #[error("Texture is {width}x{height} but has {count} pixels")]
    TextureSize {
        /// Claimed width.
        width: u32,
        /// Claimed height.
        height: u32,
        /// Actual number of pixels.
        count: usize,
    },
}
