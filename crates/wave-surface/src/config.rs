//! Defines all the CLI arguments, and the validated configuration that the simulation runs with.

use crate::error::SimulationError;

/// Waves can't be allowed to cross more than this fraction of a cell per step. It's the 2D explicit
/// CFL condition: `1 / √2`.
pub const CFL_MARGIN: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// The shallow water scheme's forward differences amplify its shortest waves, at a rate per second
/// of `2c * √(1/dx² + 1/dy²)` whatever the timestep. Its timestep is limited so that they grow by
/// no more than this fraction per step.
pub const SHALLOW_WATER_GROWTH_PER_STEP: f32 = 0.01;

/// `Config`
#[derive(clap::Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// Number of cells along x. The output images have the same width.
    #[arg(long, value_name = "Cells along x", default_value_t = 320)]
    pub width: u32,
    /// Number of cells along y. The output images have the same height.
    #[arg(long, value_name = "Cells along y", default_value_t = 240)]
    pub height: u32,
    /// Spacing between cells along x, in world units.
    #[arg(long, value_name = "World units per cell along x", default_value_t = 0.25)]
    pub dx: f32,
    /// Spacing between cells along y, in world units.
    #[arg(long, value_name = "World units per cell along y", default_value_t = 0.25)]
    pub dy: f32,
    /// The simulation timestep. It must be small enough that waves can't outrun the grid, see
    /// `CFL_MARGIN` and `SHALLOW_WATER_GROWTH_PER_STEP`. Defaults to a stable value for the
    /// chosen integrator.
    #[arg(long, value_name = "Seconds per step")]
    pub dt: Option<f32>,
    /// Which set of equations moves the water.
    #[arg(
        long,
        value_enum,
        value_name = "The integrator",
        default_value_t = IntegratorKind::Wave
    )]
    pub integrator: IntegratorKind,
    /// Gravitational acceleration. Shallow water only.
    #[arg(long, value_name = "Gravity", default_value_t = PhysicalConstants::DEFAULT.gravity)]
    pub gravity: f32,
    /// Linear drag. Shallow water only.
    #[arg(long, value_name = "Drag coefficient", default_value_t = PhysicalConstants::DEFAULT.drag)]
    pub drag: f32,
    /// Coriolis-like coupling between the velocity components. Shallow water only.
    #[arg(
        long,
        value_name = "Coriolis coefficient",
        default_value_t = PhysicalConstants::DEFAULT.coriolis
    )]
    pub coriolis: f32,
    /// Resting depth of the water. Shallow water only.
    #[arg(
        long,
        value_name = "Reference depth",
        default_value_t = PhysicalConstants::DEFAULT.reference_depth
    )]
    pub reference_depth: f32,
    /// Per-step velocity decay. Scalar wave only. Must be in `(0, 1]`.
    #[arg(long, value_name = "Damping factor", default_value_t = PhysicalConstants::DEFAULT.damping)]
    pub damping: f32,
    /// Where to run the kernel calculations.
    #[arg(
        long,
        value_enum,
        value_name = "The method of running the kernels",
        default_value_t = ComputeType::Parallel
    )]
    pub compute: ComputeType,
    /// What to do when the water stops being finite.
    #[arg(
        long,
        value_enum,
        value_name = "Divergence policy",
        default_value_t = DivergencePolicy::Fail
    )]
    pub on_divergence: DivergencePolicy,
    /// The most samples taken along any one light ray. Defaults to the larger grid dimension.
    #[arg(long, value_name = "Ray march steps")]
    pub max_steps: Option<u32>,
    /// How far, in cells, light can reach. Defaults to the larger grid dimension.
    #[arg(long, value_name = "Light range in cells")]
    pub max_travel_distance: Option<f32>,
    /// The least light any pixel receives, so that shadows aren't pitch black.
    #[arg(long, value_name = "Ambient light", default_value_t = 0.0)]
    pub ambient: f32,
    /// Paint a marker where each light is.
    #[arg(long)]
    pub show_lights: bool,
    /// The height that maps to the deepest water colour.
    #[arg(long, value_name = "Height", default_value_t = RenderSettings::DEFAULT.colour_min_height)]
    pub colour_min_height: f32,
    /// The height that maps to the shallowest water colour.
    #[arg(long, value_name = "Height", default_value_t = RenderSettings::DEFAULT.colour_max_height)]
    pub colour_max_height: f32,
    /// How strongly the surface bends the view of the background.
    #[arg(
        long,
        value_name = "Refraction strength",
        default_value_t = RenderSettings::DEFAULT.refraction_strength
    )]
    pub refraction_strength: f32,
    /// How much the water colour hides the background, from `0` to `1`.
    #[arg(
        long,
        value_name = "Water opacity",
        default_value_t = RenderSettings::DEFAULT.water_opacity
    )]
    pub water_opacity: f32,
    /// Ships' tilt is exaggerated by this much so that it's visible.
    #[arg(
        long,
        value_name = "Tilt multiplier",
        default_value_t = RenderSettings::DEFAULT.tilt_exaggeration
    )]
    pub tilt_exaggeration: f32,
    /// Background image seen through the water. A checkerboard is generated when not given.
    #[arg(long, value_name = "Path to an image")]
    pub background: Option<std::path::PathBuf>,
    /// Ship sprite. A simple hull is generated when not given.
    #[arg(long, value_name = "Path to an image")]
    pub sprite: Option<std::path::PathBuf>,
    /// How many frames to run for.
    #[arg(long, value_name = "Number of frames", default_value_t = 300)]
    pub frames: u64,
    /// Target time between frames.
    #[arg(long, value_name = "Milliseconds", default_value_t = 33)]
    pub frame_interval: u64,
    /// Save PNG snapshots every this many frames. `0` disables snapshots.
    #[arg(long, value_name = "Frames between snapshots", default_value_t = 30)]
    pub snapshot_every: u64,
    /// Where to save snapshots.
    #[arg(long, value_name = "Directory to save output to", default_value = "./output")]
    pub output_dir: std::path::PathBuf,
}

impl Config {
    /// Gather the simulation's settings from the CLI arguments.
    #[must_use]
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            integrator: self.integrator,
            compute: self.compute,
            divergence: self.on_divergence,
            render: RenderSettings {
                colour_min_height: self.colour_min_height,
                colour_max_height: self.colour_max_height,
                refraction_strength: self.refraction_strength,
                water_opacity: self.water_opacity,
                tilt_exaggeration: self.tilt_exaggeration,
                ..RenderSettings::DEFAULT
            },
            lighting: LightingSettings {
                max_steps: self.max_steps,
                max_travel_distance: self.max_travel_distance,
                ambient: self.ambient,
                show_lights: self.show_lights,
                ..LightingSettings::DEFAULT
            },
            ..SimulationConfig::new(
                self.width,
                self.height,
                self.dx,
                self.dy,
                self.dt.unwrap_or_else(|| self.integrator.default_dt()),
                PhysicalConstants {
                    gravity: self.gravity,
                    drag: self.drag,
                    coriolis: self.coriolis,
                    reference_depth: self.reference_depth,
                    damping: self.damping,
                },
            )
        }
    }
}

/// The two models of the water. They don't share a cell layout, so they can't be mixed.
#[derive(clap::ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum IntegratorKind {
    /// The damped scalar wave equation. The default.
    #[default]
    Wave,
    /// Linearised shallow water equations with drag and a Coriolis-like term.
    ShallowWater,
}

impl IntegratorKind {
    /// A timestep that's stable on the default grid.
    #[must_use]
    pub const fn default_dt(self) -> f32 {
        match self {
            Self::Wave => 0.05,
            Self::ShallowWater => 0.0001,
        }
    }
}

/// Where to run the kernels.
#[derive(clap::ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ComputeType {
    /// One row after the other on a single thread.
    CPU,
    /// Rows spread over a thread pool.
    #[default]
    Parallel,
}

/// What to do when a cell's height or velocity stops being finite.
#[derive(clap::ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DivergencePolicy {
    /// Stop the simulation with an error.
    #[default]
    Fail,
    /// Repair the offending cells and carry on.
    Clamp,
}

/// Physical constants. Which ones are used depends on the integrator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhysicalConstants {
    /// Gravitational acceleration, `g`.
    pub gravity: f32,
    /// Linear drag, `k`.
    pub drag: f32,
    /// Coriolis-like coefficient, `f`.
    pub coriolis: f32,
    /// Resting depth, `H0`.
    pub reference_depth: f32,
    /// Per-step velocity decay of the scalar wave model.
    pub damping: f32,
}

impl PhysicalConstants {
    /// Values the visuals were tuned with.
    pub const DEFAULT: Self = Self {
        gravity: 9.81,
        drag: 0.01,
        coriolis: 0.523,
        reference_depth: 1.0,
        damping: 0.99,
    };
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Settings for the compositor and for the ships' appearance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// The height that maps to the deepest water colour.
    pub colour_min_height: f32,
    /// The height that maps to the shallowest water colour.
    pub colour_max_height: f32,
    /// How far the background is displaced per unit of height gradient, in UV units.
    pub refraction_strength: f32,
    /// How much the water colour hides the background.
    pub water_opacity: f32,
    /// Ships' tilt multiplier.
    pub tilt_exaggeration: f32,
    /// How tall a fully opaque sprite pixel stands above the water, for casting shadows.
    pub hull_height: f32,
}

impl RenderSettings {
    /// Defaults.
    pub const DEFAULT: Self = Self {
        colour_min_height: 0.0,
        colour_max_height: 2.0,
        refraction_strength: 0.5,
        water_opacity: 0.6,
        tilt_exaggeration: wave_surface_kernel::pose::TILT_EXAGGERATION,
        hull_height: 0.05,
    };
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Settings for the lighting pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightingSettings {
    /// Cap on ray march samples. `None` means the larger grid dimension.
    pub max_steps: Option<u32>,
    /// Light range in cells. `None` means the larger grid dimension.
    pub max_travel_distance: Option<f32>,
    /// The least light any pixel receives.
    pub ambient: f32,
    /// Paint a marker where each light is.
    pub show_lights: bool,
    /// Marker radius as a fraction of the grid width.
    pub marker_fraction: f32,
}

impl LightingSettings {
    /// Defaults.
    pub const DEFAULT: Self = Self {
        max_steps: None,
        max_travel_distance: None,
        ambient: 0.0,
        show_lights: false,
        marker_fraction: 0.01,
    };
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything the simulation needs to know before its first frame. Fixed for the whole run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Number of cells along x.
    pub width: u32,
    /// Number of cells along y.
    pub height: u32,
    /// Cell spacing along x, in world units.
    pub dx: f32,
    /// Cell spacing along y, in world units.
    pub dy: f32,
    /// Timestep.
    pub dt: f32,
    /// Physical constants.
    pub physics: PhysicalConstants,
    /// Which model moves the water.
    pub integrator: IntegratorKind,
    /// Where the kernels run.
    pub compute: ComputeType,
    /// What to do about non-finite cells.
    pub divergence: DivergencePolicy,
    /// Compositor settings.
    pub render: RenderSettings,
    /// Lighting settings.
    pub lighting: LightingSettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::for_integrator(IntegratorKind::default())
    }
}

impl SimulationConfig {
    /// Instantiate with default settings for everything but the grid and its physics.
    #[must_use]
    pub const fn new(
        width: u32,
        height: u32,
        dx: f32,
        dy: f32,
        dt: f32,
        physics: PhysicalConstants,
    ) -> Self {
        Self {
            width,
            height,
            dx,
            dy,
            dt,
            physics,
            integrator: IntegratorKind::Wave,
            compute: ComputeType::Parallel,
            divergence: DivergencePolicy::Fail,
            render: RenderSettings::DEFAULT,
            lighting: LightingSettings::DEFAULT,
        }
    }

    /// The default grid, with the integrator's own default timestep.
    #[must_use]
    pub const fn for_integrator(integrator: IntegratorKind) -> Self {
        Self {
            integrator,
            ..Self::new(
                320,
                240,
                0.25,
                0.25,
                integrator.default_dt(),
                PhysicalConstants::DEFAULT,
            )
        }
    }

    /// The grid's shape.
    #[must_use]
    pub const fn dimensions(&self) -> wave_surface_kernel::grid::Dimensions {
        wave_surface_kernel::grid::Dimensions::new(self.width, self.height)
    }

    /// The size of the whole domain in world units.
    #[must_use]
    #[expect(
        clippy::as_conversions,
        clippy::cast_precision_loss,
        reason = "Grid dimensions are far smaller than `f32`'s integer precision"
    )]
    pub fn world_size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32 * self.dx, self.height as f32 * self.dy)
    }

    /// How fast waves travel under the chosen integrator.
    ///
    /// The scalar wave stencil divides its Laplacian by `dx * dy`, so in grid terms its waves move
    /// at one unit per second. Shallow water waves move at `√(g * H0)`.
    #[must_use]
    pub fn wave_speed(&self) -> f32 {
        match self.integrator {
            IntegratorKind::Wave => 1.0,
            IntegratorKind::ShallowWater => {
                (self.physics.gravity * self.physics.reference_depth).sqrt()
            }
        }
    }

    /// How fast, per second, the shortest waves of the shallow water scheme grow.
    #[must_use]
    pub fn shallow_water_growth_rate(&self) -> f32 {
        2.0 * self.wave_speed() * (self.dx.powi(-2) + self.dy.powi(-2)).sqrt()
    }

    /// The largest timestep that keeps the explicit schemes stable.
    ///
    /// Both schemes must satisfy the CFL condition. The shallow water scheme must also keep the
    /// growth of its shortest waves within `SHALLOW_WATER_GROWTH_PER_STEP`.
    #[must_use]
    pub fn stability_limit(&self) -> f32 {
        let cfl = CFL_MARGIN * self.dx.min(self.dy) / self.wave_speed();
        match self.integrator {
            IntegratorKind::Wave => cfl,
            IntegratorKind::ShallowWater => {
                cfl.min(SHALLOW_WATER_GROWTH_PER_STEP / self.shallow_water_growth_rate())
            }
        }
    }

    /// The larger grid dimension. Used as the default reach of lights.
    #[must_use]
    pub fn longest_side(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Check that the simulation can run with this configuration.
    ///
    /// # Errors
    /// The first problem found.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let max_side = i32::MAX.unsigned_abs();
        if self.width == 0 || self.height == 0 || self.width > max_side || self.height > max_side {
            return Err(SimulationError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let physics = self.physics;
        let render = self.render;
        for (name, value) in [
            ("dx", self.dx),
            ("dy", self.dy),
            ("dt", self.dt),
            ("gravity", physics.gravity),
            ("drag", physics.drag),
            ("coriolis", physics.coriolis),
            ("reference_depth", physics.reference_depth),
            ("damping", physics.damping),
            ("colour_min_height", render.colour_min_height),
            ("colour_max_height", render.colour_max_height),
            ("refraction_strength", render.refraction_strength),
            ("water_opacity", render.water_opacity),
            ("tilt_exaggeration", render.tilt_exaggeration),
            ("hull_height", render.hull_height),
            ("ambient", self.lighting.ambient),
        ] {
            if !value.is_finite() {
                return Err(SimulationError::NonFiniteParameter { name, value });
            }
        }

        for (name, value) in [
            ("dx", self.dx),
            ("dy", self.dy),
            ("dt", self.dt),
            ("gravity", physics.gravity),
            ("reference_depth", physics.reference_depth),
        ] {
            if value <= 0.0 {
                return Err(SimulationError::NonPositiveParameter { name, value });
            }
        }

        if physics.damping <= 0.0 || physics.damping > 1.0 {
            return Err(SimulationError::OutOfRange {
                name: "damping",
                value: physics.damping,
                range: "(0, 1]",
            });
        }

        if !(0.0..=1.0).contains(&render.water_opacity) {
            return Err(SimulationError::OutOfRange {
                name: "water_opacity",
                value: render.water_opacity,
                range: "[0, 1]",
            });
        }

        if render.colour_max_height <= render.colour_min_height {
            return Err(SimulationError::OutOfRange {
                name: "colour_max_height",
                value: render.colour_max_height,
                range: "(colour_min_height, ∞)",
            });
        }

        if let Some(distance) = self.lighting.max_travel_distance {
            if !distance.is_finite() || distance <= 0.0 {
                return Err(SimulationError::NonPositiveParameter {
                    name: "max_travel_distance",
                    value: distance,
                });
            }
        }

        let limit = self.stability_limit();
        if self.dt > limit {
            return Err(SimulationError::UnstableTimestep { dt: self.dt, limit });
        }

        Ok(())
    }
}
