//! The whole simulation, one frame at a time.
//!
//! A frame is a strict pipeline, each stage consuming the previous stage's output:
//!
//!   ships move and ride the surface
//!     -> ships displace the water, the water is integrated, the buffers swap
//!     -> the water is coloured and the ships are drawn on it
//!     -> lights are ray marched over the water and the ships
//!
//! Within a stage every cell or pixel is independent, so stages are dispatched to the executor.

use glam::Vec4;
use wave_surface_kernel::{
    injection::{BUMP, InjectionConstants, RADIUS_FRACTION},
    lighting::LightSource,
    pose::Pose,
};

use crate::{
    agents::{Agent, default_roster},
    compositor::{Compositor, SpriteReport},
    config::SimulationConfig,
    error::SimulationError,
    executor::Executor,
    integrator::Surface,
    lighting::Lighting,
    lights::{Light, default_lights},
    texture::Texture,
};

/// Owns everything that persists between frames.
#[derive(Debug)]
pub struct Simulation {
    /// Fixed for the whole run.
    config: SimulationConfig,
    /// Dispatches the kernels.
    executor: Executor,
    /// The water.
    surface: Surface,
    /// The ships.
    agents: Vec<Agent>,
    /// The lights.
    lights: Vec<Light>,
    /// Colours the water and draws the ships.
    compositor: Compositor,
    /// Lights the final image.
    lighting: Lighting,
    /// How ships displace the water.
    injection: InjectionConstants,
    /// The number of completed frames.
    frame: u64,
    /// Scratch: water heights for the current frame.
    heights: Vec<f32>,
    /// Scratch: how tall the ships stand at each pixel.
    ship_heights: Vec<f32>,
    /// Scratch: water plus ships.
    shadow_surface: Vec<f32>,
    /// Scratch: the unlit image.
    diffuse: Vec<Vec4>,
    /// The final image.
    colour: Vec<Vec4>,
    /// Scratch: the ships' poses.
    poses: Vec<Pose>,
    /// Scratch: the lights in grid units.
    kernel_lights: Vec<LightSource>,
    /// Scratch: where the ships are, in world units.
    ship_positions: Vec<glam::Vec2>,
}

impl Simulation {
    /// Validate the configuration and set up still water, with the default ships, lights and
    /// generated textures.
    ///
    /// # Errors
    /// If the configuration is invalid, see [`SimulationConfig::validate`].
    pub fn configure(config: SimulationConfig) -> Result<Self, SimulationError> {
        Self::configure_with_textures(config, None, None)
    }

    /// Like [`Simulation::configure`], but with a background and ship sprite. Either one that's
    /// `None` is generated.
    ///
    /// # Errors
    /// If the configuration is invalid, see [`SimulationConfig::validate`].
    pub fn configure_with_textures(
        config: SimulationConfig,
        background: Option<Texture>,
        sprite: Option<Texture>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        let dimensions = config.dimensions();
        let world_size = config.world_size();
        let cell_count = dimensions.cell_count();

        tracing::info!(
            "Configured a {}x{} {:?} surface, stable up to dt = {}",
            config.width,
            config.height,
            config.integrator,
            config.stability_limit()
        );

        Ok(Self {
            executor: Executor::new(config.compute),
            surface: Surface::new(&config),
            agents: default_roster(world_size),
            lights: default_lights(world_size),
            compositor: Compositor::new(
                &config,
                background.unwrap_or_else(|| Texture::default_background(dimensions)),
                sprite.unwrap_or_else(Texture::default_sprite),
            ),
            lighting: Lighting::new(&config),
            injection: InjectionConstants {
                dx: config.dx,
                dy: config.dy,
                radius: (RADIUS_FRACTION * world_size.x)
                    .max(config.dx.max(config.dy) * core::f32::consts::FRAC_1_SQRT_2),
                bump: BUMP,
            },
            frame: 0,
            heights: vec![0.0; cell_count],
            ship_heights: vec![0.0; cell_count],
            shadow_surface: vec![0.0; cell_count],
            diffuse: vec![Vec4::ZERO; cell_count],
            colour: vec![Vec4::ZERO; cell_count],
            poses: Vec::new(),
            kernel_lights: Vec::new(),
            ship_positions: Vec::new(),
            config,
        })
    }

    /// Replace the ships.
    #[must_use]
    pub fn with_agents(mut self, agents: Vec<Agent>) -> Self {
        self.agents = agents;
        self
    }

    /// Replace the lights.
    #[must_use]
    pub fn with_lights(mut self, lights: Vec<Light>) -> Self {
        self.lights = lights;
        self
    }

    /// Run the whole pipeline once and return the final image, row by row.
    ///
    /// # Errors
    /// If the water diverges and the policy is to fail.
    pub fn advance_one_frame(&mut self) -> Result<&[Vec4], SimulationError> {
        let frame = self.frame;
        let render = self.config.render;

        for agent in &mut self.agents {
            agent.advance(frame);
            agent.derive_pose(
                &self.surface,
                self.config.dx,
                self.config.dy,
                render.tilt_exaggeration,
            );
        }

        self.step_field()?;

        self.surface.fill_heights(&mut self.heights);
        self.compositor
            .diffuse(&self.executor, &self.heights, &mut self.diffuse);

        let world_size = self.config.world_size();
        self.poses.clear();
        self.poses
            .extend(self.agents.iter().map(|agent| agent.pose(world_size)));
        let report: SpriteReport =
            self.compositor
                .draw_sprites(&self.poses, &mut self.diffuse, &mut self.ship_heights);

        self.kernel_lights.clear();
        for light in &mut self.lights {
            light.advance(frame);
            self.kernel_lights
                .push(light.to_kernel(self.config.dx, self.config.dy));
        }
        Lighting::combine_surfaces(&self.heights, &self.ship_heights, &mut self.shadow_surface);
        self.lighting.light(
            &self.executor,
            &self.kernel_lights,
            &self.shadow_surface,
            &self.diffuse,
            &mut self.colour,
        );

        tracing::debug!(
            "Frame {frame}: energy {:.6}, {} sprite pixels",
            self.surface.total_energy(),
            report.covered_pixels
        );

        self.frame += 1;
        Ok(&self.colour)
    }

    /// Advance the water alone by one step: ships displace it, it's integrated, checked for
    /// divergence, and the buffers are swapped.
    ///
    /// # Errors
    /// If the water diverges and the policy is to fail.
    pub fn step_field(&mut self) -> Result<(), SimulationError> {
        self.ship_positions.clear();
        self.ship_positions
            .extend(self.agents.iter().map(|agent| agent.position));
        self.surface
            .inject(&self.executor, &self.injection, &self.ship_positions);
        self.surface
            .step(&self.executor, self.config.divergence, self.frame)
    }

    /// Raise or lower the water at a single cell.
    pub fn perturb(&mut self, x: i32, y: i32, amount: f32) {
        self.surface.perturb(x, y, amount);
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The number of completed frames.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// The water.
    #[must_use]
    pub const fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The ships.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// The lights.
    #[must_use]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// The most recent final image.
    #[must_use]
    pub fn colour(&self) -> &[Vec4] {
        &self.colour
    }

    /// The water heights as they were when the most recent image was drawn.
    #[must_use]
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// `Σ h² + |velocity|²` over the water.
    #[must_use]
    pub fn total_energy(&self) -> f64 {
        self.surface.total_energy()
    }
}
