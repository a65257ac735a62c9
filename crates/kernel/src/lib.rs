//! The per-cell and per-pixel kernels of the wave surface. We keep them in a seperate crate so that
//! they stay free of `std` and of allocations: every kernel is a pure function of its coordinates,
//! its constants and the buffers it reads, so any executor can dispatch it. A serial loop, a thread
//! pool or a shader target all see the same code.

#![cfg_attr(not(test), no_std)]
#![expect(
    clippy::indexing_slicing,
    reason = "Kernels only index with coordinates that have already been edge-clamped"
)]

pub mod cell;
pub mod compositor;
pub mod grid;
pub mod injection;
pub mod lighting;
pub mod pose;
pub mod shallow_water;
pub mod wave;
