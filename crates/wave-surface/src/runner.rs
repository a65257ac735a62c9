//! Drives the simulation at a steady frame rate and saves snapshots along the way.

use color_eyre::Result;

use crate::simulation::Simulation;

/// How to drive the simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSettings {
    /// How many frames to run for.
    pub frames: u64,
    /// Target time between the starts of consecutive frames.
    pub frame_interval: std::time::Duration,
    /// Save snapshots every this many frames. `0` disables snapshots.
    pub snapshot_every: u64,
    /// Where to save snapshots.
    pub output_dir: std::path::PathBuf,
}

impl From<&crate::config::Config> for RunSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            frames: config.frames,
            frame_interval: std::time::Duration::from_millis(config.frame_interval),
            snapshot_every: config.snapshot_every,
            output_dir: config.output_dir.clone(),
        }
    }
}

/// What happened during a run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames completed.
    pub frames: u64,
    /// Frames that took longer than the frame interval.
    pub overruns: u64,
    /// Snapshots saved.
    pub snapshots: u64,
}

/// Run the simulation for the configured number of frames.
///
/// Frames are paced by sleeping for whatever is left of the frame interval. A frame that overruns
/// its interval is followed immediately by the next one.
///
/// # Errors
/// If the simulation diverges, or a snapshot can't be saved.
pub fn run(simulation: &mut Simulation, settings: &RunSettings) -> Result<RunSummary> {
    if settings.snapshot_every > 0 {
        std::fs::create_dir_all(&settings.output_dir)?;
    }

    let mut summary = RunSummary::default();
    for frame in 0..settings.frames {
        let started = std::time::Instant::now();
        simulation.advance_one_frame()?;
        summary.frames += 1;

        if settings.snapshot_every > 0 && frame % settings.snapshot_every == 0 {
            save_snapshot(simulation, &settings.output_dir, frame)?;
            summary.snapshots += 1;
        }

        let elapsed = started.elapsed();
        tracing::debug!("Frame {frame} took {elapsed:?}");
        if let Some(remaining) = settings.frame_interval.checked_sub(elapsed) {
            std::thread::sleep(remaining);
        } else {
            summary.overruns += 1;
        }
    }

    tracing::info!(
        "Finished {} frames, {} over budget, with {} snapshots",
        summary.frames,
        summary.overruns,
        summary.snapshots
    );

    Ok(summary)
}

/// Save the current image and height field.
fn save_snapshot(simulation: &Simulation, directory: &std::path::Path, frame: u64) -> Result<()> {
    let config = simulation.config();
    let colour_path = directory.join(format!("frame_{frame:05}.png"));
    let height_path = directory.join(format!("height_{frame:05}.png"));
    tracing::debug!("Saving snapshot to {}", colour_path.display());

    crate::output::png::save_colour(
        simulation.colour(),
        config.width,
        config.height,
        &colour_path,
    )?;
    crate::output::png::save(
        simulation.heights(),
        config.width,
        config.height,
        &height_path,
    )?;

    Ok(())
}
