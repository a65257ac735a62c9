//! Output data as ASCII. Most likely useful for tests.

#![cfg(test)]

use wave_surface_kernel::grid::Dimensions;

/// Render a grid of values, one string per row, with each value drawn by `symbol`.
fn render(
    dimensions: Dimensions,
    values: &[f32],
    symbol: impl Fn(f32) -> &'static str,
) -> Vec<String> {
    values
        .chunks(usize::try_from(dimensions.width).unwrap())
        .map(|row| {
            row.iter()
                .map(|value| symbol(*value))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// `#` for a pixel that receives any light at all, `.` for total darkness.
pub fn shadow_map(dimensions: Dimensions, lightness: &[f32]) -> Vec<String> {
    render(dimensions, lightness, |value| if value > 0.0 { "#" } else { "." })
}

/// `+` above the resting level, `-` below it, `.` for anything within `tolerance` of it.
pub fn height_map(dimensions: Dimensions, heights: &[f32], tolerance: f32) -> Vec<String> {
    render(dimensions, heights, |value| {
        if value > tolerance {
            "+"
        } else if value < -tolerance {
            "-"
        } else {
            "."
        }
    })
}

mod test {
    use super::*;

    #[test]
    fn draws_one_string_per_row() {
        #[rustfmt::skip]
        let heights = [
            0.5, 0.0, -0.5,
            0.0, 0.001, 0.0,
        ];
        assert_eq!(
            height_map(Dimensions::new(3, 2), &heights, 0.01),
            ["+ . -", ". . ."]
        );
    }
}
