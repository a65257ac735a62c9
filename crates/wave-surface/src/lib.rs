//! A real-time water surface: ships sail in circles, displacing the water as they go, and lights
//! sweep across the scene casting soft shadows over the waves and the ships.
//!
//! The per-cell and per-pixel maths lives in the `wave_surface_kernel` crate. This crate owns the
//! buffers, dispatches the kernels, and drives the frames.

pub mod agents;
pub mod compositor;
pub mod config;
pub mod error;
pub mod executor;
pub mod field;
pub mod integrator;
pub mod lighting;
pub mod lights;
/// Various ways to output data.
pub mod output {
    pub mod ascii;
    pub mod png;
}
pub mod runner;
pub mod simulation;
pub mod texture;
