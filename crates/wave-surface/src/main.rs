//! Wave Surface

use clap::Parser as _;
use color_eyre::eyre::Result;
use tracing_subscriber::{Layer as _, layer::SubscriberExt as _, util::SubscriberInitExt as _};
use wave_surface::{config::Config, runner, simulation::Simulation, texture::Texture};

fn main() -> Result<()> {
    color_eyre::install()?;
    setup_logging()?;

    let config = Config::parse();
    tracing::info!("Initialising with config: {config:?}");

    let background = config.background.as_deref().map(Texture::load).transpose()?;
    let sprite = config.sprite.as_deref().map(Texture::load).transpose()?;
    let mut simulation =
        Simulation::configure_with_textures(config.simulation_config(), background, sprite)?;

    tracing::info!("Starting simulation");
    runner::run(&mut simulation, &runner::RunSettings::from(&config))?;

    Ok(())
}

/// Setup logging.
fn setup_logging() -> Result<()> {
    let filters = tracing_subscriber::EnvFilter::builder()
        .with_default_directive("info".parse()?)
        .from_env_lossy();
    let filter_layer = tracing_subscriber::fmt::layer().with_filter(filters);
    let tracing_setup = tracing_subscriber::registry().with(filter_layer);
    tracing_setup.init();

    Ok(())
}
