//! Moves the water forward in time.
//!
//! The scalar wave model and the shallow water model have different cell layouts, so rather than
//! conflating them the surface is one or the other for the whole run. Either way a step is:
//!
//!   1. ships bump the current buffer,
//!   2. the integrator reads the current buffer and writes the next,
//!   3. the next buffer is checked for divergence,
//!   4. the buffers are swapped.

use wave_surface_kernel::{
    cell::{Cell, ShallowWaterCell, WaveCell},
    grid::Dimensions,
    injection::InjectionConstants,
    pose::HeightSamples,
    shallow_water::ShallowWaterConstants,
    wave::WaveConstants,
};

use crate::{
    config::{DivergencePolicy, IntegratorKind, SimulationConfig},
    error::SimulationError,
    executor::Executor,
    field::{BufferId, Field},
};

/// Components of repaired cells are clamped to `±DIVERGENCE_CLAMP`.
pub const DIVERGENCE_CLAMP: f32 = 100.0;

/// The water surface under one of the two models.
#[derive(Clone, Debug)]
pub enum Surface {
    /// The scalar wave model.
    Wave {
        /// Heights and vertical velocities.
        field: Field<WaveCell>,
        /// Kernel constants.
        constants: WaveConstants,
    },
    /// The shallow water model.
    ShallowWater {
        /// Heights and horizontal velocities.
        field: Field<ShallowWaterCell>,
        /// Kernel constants.
        constants: ShallowWaterConstants,
    },
}

/// Run the same code against whichever field the surface has.
macro_rules! with_field {
    ($surface:expr, $field:ident => $body:expr) => {
        match $surface {
            Surface::Wave { $field, .. } => $body,
            Surface::ShallowWater { $field, .. } => $body,
        }
    };
}

impl Surface {
    /// Instantiate still water.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        let dimensions = config.dimensions();
        let physics = config.physics;
        match config.integrator {
            IntegratorKind::Wave => Self::Wave {
                field: Field::new(dimensions),
                constants: WaveConstants {
                    dimensions,
                    dx: config.dx,
                    dy: config.dy,
                    dt: config.dt,
                    damping: physics.damping,
                },
            },
            IntegratorKind::ShallowWater => Self::ShallowWater {
                field: Field::new(dimensions),
                constants: ShallowWaterConstants {
                    dimensions,
                    dx: config.dx,
                    dy: config.dy,
                    dt: config.dt,
                    gravity: physics.gravity,
                    drag: physics.drag,
                    coriolis: physics.coriolis,
                    reference_depth: physics.reference_depth,
                },
            },
        }
    }

    /// Which model this is.
    #[must_use]
    pub const fn kind(&self) -> IntegratorKind {
        match self {
            Self::Wave { .. } => IntegratorKind::Wave,
            Self::ShallowWater { .. } => IntegratorKind::ShallowWater,
        }
    }

    /// The shape of the grid.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        with_field!(self, field => field.dimensions())
    }

    /// How many steps have completed.
    #[must_use]
    pub fn generation(&self) -> u64 {
        with_field!(self, field => field.generation())
    }

    /// Ships displace the water under them. Applied to the current buffer so that the coming
    /// step's stencil already sees the bump at neighbouring cells.
    pub fn inject(
        &mut self,
        executor: &Executor,
        constants: &InjectionConstants,
        ships: &[glam::Vec2],
    ) {
        if ships.is_empty() {
            return;
        }

        with_field!(self, field => {
            let dimensions = field.dimensions();
            executor.update_each_cell(dimensions, field.write(BufferId::Current), |x, y, cell| {
                cell.add_height(wave_surface_kernel::injection::kernel(x, y, constants, ships));
            });
        });
    }

    /// Compute the next buffer from the current one. Doesn't swap.
    pub fn integrate(&mut self, executor: &Executor) {
        match self {
            Self::Wave { field, constants } => {
                integrate(executor, field, constants, wave_surface_kernel::wave::kernel);
            }
            Self::ShallowWater { field, constants } => {
                integrate(
                    executor,
                    field,
                    constants,
                    wave_surface_kernel::shallow_water::kernel,
                );
            }
        }
    }

    /// Scan the next buffer for non-finite values and deal with them according to `policy`.
    ///
    /// # Errors
    /// When the policy is to fail and a cell has diverged.
    pub fn check_divergence(
        &mut self,
        policy: DivergencePolicy,
        frame: u64,
    ) -> Result<(), SimulationError> {
        with_field!(self, field => check_divergence(field, policy, frame))
    }

    /// Make the freshly integrated buffer the current one.
    pub fn swap(&mut self) {
        with_field!(self, field => field.swap());
    }

    /// Integrate, check and swap. Injection is left to the caller.
    ///
    /// # Errors
    /// When the policy is to fail and a cell has diverged.
    pub fn step(
        &mut self,
        executor: &Executor,
        policy: DivergencePolicy,
        frame: u64,
    ) -> Result<(), SimulationError> {
        self.integrate(executor);
        self.check_divergence(policy, frame)?;
        self.swap();
        Ok(())
    }

    /// Raise or lower the current surface at a single cell.
    pub fn perturb(&mut self, x: i32, y: i32, amount: f32) {
        with_field!(self, field => field.perturb(x, y, amount));
    }

    /// The current height at a cell.
    #[must_use]
    pub fn height_at(&self, x: i32, y: i32) -> f32 {
        with_field!(self, field => field.height_at(x, y))
    }

    /// Copy the current heights into `heights`.
    pub fn fill_heights(&self, heights: &mut [f32]) {
        with_field!(self, field => field.fill_heights(heights));
    }

    /// The current heights, row by row.
    #[must_use]
    pub fn heights(&self) -> Vec<f32> {
        with_field!(self, field => field.heights())
    }

    /// Heights around a fractional grid position, for deriving a ship's pose.
    #[must_use]
    pub fn samples(&self, x: f32, y: f32) -> HeightSamples {
        with_field!(self, field => {
            HeightSamples::gather(field.read(BufferId::Current), field.dimensions(), x, y)
        })
    }

    /// `Σ h² + |velocity|²` over the current buffer.
    #[must_use]
    pub fn total_energy(&self) -> f64 {
        with_field!(self, field => field.total_energy())
    }

    /// Whether every current cell is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        with_field!(self, field => field.is_finite())
    }
}

/// Run a stencil kernel over the whole field, reading the current buffer and writing the next.
fn integrate<C: Cell, P: Sync>(
    executor: &Executor,
    field: &mut Field<C>,
    constants: &P,
    kernel: fn(u32, u32, &P, &[C]) -> C,
) {
    let dimensions = field.dimensions();
    let (previous, next) = field.split();
    executor.for_each_cell(dimensions, next, |x, y| kernel(x, y, constants, previous));
}

/// See [`Surface::check_divergence`].
fn check_divergence<C: Cell>(
    field: &mut Field<C>,
    policy: DivergencePolicy,
    frame: u64,
) -> Result<(), SimulationError> {
    let Some((x, y)) = field.first_non_finite(BufferId::Next) else {
        return Ok(());
    };

    match policy {
        DivergencePolicy::Fail => Err(SimulationError::Diverged { frame, x, y }),
        DivergencePolicy::Clamp => {
            let repaired = field.repair(BufferId::Next, DIVERGENCE_CLAMP);
            tracing::warn!(
                "Frame {frame}: repaired {repaired} diverging cells, the first at ({x}, {y})"
            );
            Ok(())
        }
    }
}

#[expect(clippy::float_cmp, reason = "They're just tests")]
#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{ComputeType, PhysicalConstants};

    fn config(integrator: IntegratorKind) -> SimulationConfig {
        SimulationConfig {
            integrator,
            ..SimulationConfig::new(8, 6, 1.0, 1.0, 0.1, PhysicalConstants::DEFAULT)
        }
    }

    fn run(surface: &mut Surface, executor: &Executor, steps: u64) {
        for frame in 0..steps {
            surface
                .step(executor, DivergencePolicy::Fail, frame)
                .unwrap();
        }
    }

    #[test]
    fn still_water_stays_still() {
        let executor = Executor::new(ComputeType::CPU);
        for kind in [IntegratorKind::Wave, IntegratorKind::ShallowWater] {
            let mut surface = Surface::new(&config(kind));
            assert_eq!(surface.kind(), kind);
            run(&mut surface, &executor, 50);
            assert!(surface.heights().iter().all(|height| *height == 0.0));
            assert_eq!(surface.total_energy(), 0.0);
            assert_eq!(surface.generation(), 50);
        }
    }

    #[test]
    fn serial_and_parallel_are_identical() {
        for kind in [IntegratorKind::Wave, IntegratorKind::ShallowWater] {
            let mut serial = Surface::new(&config(kind));
            let mut parallel = Surface::new(&config(kind));
            serial.perturb(3, 2, 1.0);
            parallel.perturb(3, 2, 1.0);

            run(&mut serial, &Executor::new(ComputeType::CPU), 30);
            run(&mut parallel, &Executor::new(ComputeType::Parallel), 30);

            assert_eq!(serial.heights(), parallel.heights());
        }
    }

    #[test]
    fn injection_bumps_cells_near_ships() {
        let executor = Executor::new(ComputeType::CPU);
        let mut surface = Surface::new(&config(IntegratorKind::Wave));
        let constants = InjectionConstants {
            dx: 1.0,
            dy: 1.0,
            radius: 0.5,
            bump: wave_surface_kernel::injection::BUMP,
        };
        surface.inject(&executor, &constants, &[glam::Vec2::new(2.5, 1.5)]);

        assert_eq!(surface.height_at(2, 1), wave_surface_kernel::injection::BUMP);
        assert_eq!(surface.height_at(3, 1), 0.0);
        assert_eq!(surface.generation(), 0);
    }

    #[test]
    fn divergence_fails_or_is_repaired() {
        let executor = Executor::new(ComputeType::CPU);

        let mut failing = Surface::new(&config(IntegratorKind::Wave));
        failing.perturb(4, 3, f32::INFINITY);
        assert_eq!(
            failing.step(&executor, DivergencePolicy::Fail, 7),
            Err(SimulationError::Diverged {
                frame: 7,
                x: 4,
                y: 2
            })
        );

        let mut clamping = Surface::new(&config(IntegratorKind::ShallowWater));
        clamping.perturb(4, 3, f32::NAN);
        clamping
            .step(&executor, DivergencePolicy::Clamp, 7)
            .unwrap();
        assert!(clamping.is_finite());
        assert!(clamping.heights().iter().all(|height| height.abs() <= DIVERGENCE_CLAMP));
    }

    #[test]
    fn samples_follow_the_surface() {
        let mut surface = Surface::new(&config(IntegratorKind::Wave));
        surface.perturb(3, 3, 1.0);
        surface.perturb(2, 3, 0.5);
        let samples = surface.samples(2.5, 3.5);
        assert_eq!(samples.centre, 0.5);
        assert_eq!(samples.x_plus, 1.0);
        assert_eq!(samples.x_minus, 0.0);
    }
}
