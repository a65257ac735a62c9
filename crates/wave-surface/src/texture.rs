//! Static images: the background seen through the water, and the ships' sprite.

use color_eyre::Result;
use glam::Vec4;
use wave_surface_kernel::grid::Dimensions;

use crate::error::SimulationError;

/// Side length of the generated ship sprite.
const SPRITE_SIZE: u32 = 32;

/// The number of squares along the generated background's width.
const CHECKERBOARD_SQUARES: u32 = 16;

/// An RGBA image with linear `f32` channels, row by row from the top-left.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    /// The image's shape.
    pub dimensions: Dimensions,
    /// The image's pixels.
    pub pixels: Vec<Vec4>,
}

impl Texture {
    /// Instantiate.
    ///
    /// # Errors
    /// If the number of pixels doesn't match the dimensions.
    pub fn new(dimensions: Dimensions, pixels: Vec<Vec4>) -> Result<Self, SimulationError> {
        if dimensions.width == 0 || dimensions.height == 0 || pixels.len() != dimensions.cell_count()
        {
            return Err(SimulationError::TextureSize {
                width: dimensions.width,
                height: dimensions.height,
                count: pixels.len(),
            });
        }

        Ok(Self { dimensions, pixels })
    }

    /// Load and decode an image from disk.
    ///
    /// # Errors
    /// If the file can't be read or decoded.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        tracing::debug!("Loading texture from {}", path.display());
        let decoded = image::open(path)?.to_rgba32f();
        let dimensions = Dimensions::new(decoded.width(), decoded.height());
        let pixels = decoded.pixels().map(|pixel| Vec4::from_array(pixel.0)).collect();
        Ok(Self::new(dimensions, pixels)?)
    }

    /// The background used when none is given: a checkerboard the size of the grid.
    #[must_use]
    pub fn default_background(dimensions: Dimensions) -> Self {
        Self::checkerboard(dimensions, dimensions.width.div_ceil(CHECKERBOARD_SQUARES))
    }

    /// The sprite used when none is given.
    #[must_use]
    pub fn default_sprite() -> Self {
        Self::hull_sprite(SPRITE_SIZE)
    }

    /// Two-tone squares of `square_size` pixels. A stand-in for a sea bed.
    #[must_use]
    pub fn checkerboard(dimensions: Dimensions, square_size: u32) -> Self {
        let light = Vec4::new(0.85, 0.8, 0.6, 1.0);
        let dark = Vec4::new(0.55, 0.5, 0.35, 1.0);
        let square_size = square_size.max(1);

        let pixels = (0..dimensions.cell_count())
            .map(|index| {
                let (x, y) = dimensions.coordinates(index);
                if (x / square_size + y / square_size) % 2 == 0 {
                    light
                } else {
                    dark
                }
            })
            .collect();

        Self { dimensions, pixels }
    }

    /// A simple top-down hull, pointing along +x, on a transparent background.
    #[must_use]
    #[expect(
        clippy::as_conversions,
        clippy::cast_precision_loss,
        reason = "Sprite dimensions are tiny"
    )]
    pub fn hull_sprite(size: u32) -> Self {
        let hull = Vec4::new(0.45, 0.3, 0.15, 1.0);
        let deck = Vec4::new(0.75, 0.6, 0.4, 1.0);
        let dimensions = Dimensions::new(size.max(1), size.max(1));
        let side = dimensions.width as f32;

        let pixels = (0..dimensions.cell_count())
            .map(|index| {
                let (x, y) = dimensions.coordinates(index);
                let u = (x as f32 + 0.5) / side - 0.5;
                let v = (y as f32 + 0.5) / side - 0.5;
                let distance = (u / 0.45).powi(2) + (v / 0.2).powi(2);
                if distance <= 0.4 {
                    deck
                } else if distance <= 1.0 {
                    hull
                } else {
                    Vec4::ZERO
                }
            })
            .collect();

        Self { dimensions, pixels }
    }
}
