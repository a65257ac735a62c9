//! Converting frames and height fields to PNG images.
use color_eyre::{Result, eyre::ContextCompat as _};
use glam::Vec4;

/// Convert an array of floats to a grayscale heatmap, normalised to the data's own range.
pub fn save(data: &[f32], width: u32, height: u32, path: &std::path::Path) -> Result<()> {
    let (min, max) = data
        .iter()
        .filter(|value| value.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &value| {
            (min.min(value), max.max(value))
        });
    let range = if max - min > 0.0 { max - min } else { 1.0 };

    let pixels: Vec<u8> = data
        .iter()
        .map(|&value| to_byte((value - min) / range))
        .collect();

    let count = pixels.len();
    let png: image::GrayImage = image::GrayImage::from_vec(width, height, pixels).context(
        format!("Dimensions ({width}x{height}) don't match the amount of data ({count})."),
    )?;

    png.save(path)?;

    Ok(())
}

/// Save a colour buffer. Channels are clamped to `[0, 1]`.
pub fn save_colour(data: &[Vec4], width: u32, height: u32, path: &std::path::Path) -> Result<()> {
    let pixels: Vec<u8> = data
        .iter()
        .flat_map(|pixel| pixel.to_array())
        .map(to_byte)
        .collect();

    let count = data.len();
    let png: image::RgbaImage = image::RgbaImage::from_vec(width, height, pixels).context(
        format!("Dimensions ({width}x{height}) don't match the amount of data ({count})."),
    )?;

    png.save(path)?;

    Ok(())
}

/// Convert a unit float to a byte. `NaN`s become 0.
fn to_byte(value: f32) -> u8 {
    let clamped = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0) * 255.0
    };

    #[expect(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "We've already guaranteed all the values are within the correct range"
    )]
    {
        clamped.round() as u8
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn saves_heights_as_grayscale() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("height.png");
        save(&[-1.0, 0.0, 1.0, 1.0], 2, 2, &path).unwrap();

        let png = image::open(&path).unwrap().to_luma8();
        assert_eq!(png.into_raw(), [0, 128, 255, 255]);
    }

    #[test]
    fn saves_colours_clamped() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("frame.png");
        save_colour(
            &[Vec4::new(2.0, -1.0, 0.5, 1.0), Vec4::new(0.0, 1.0, f32::NAN, 1.0)],
            2,
            1,
            &path,
        )
        .unwrap();

        let png = image::open(&path).unwrap().to_rgba8();
        assert_eq!(png.into_raw(), [255, 0, 128, 255, 0, 255, 0, 255]);
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("broken.png");
        assert!(save(&[0.0; 3], 2, 2, &path).is_err());
    }
}
