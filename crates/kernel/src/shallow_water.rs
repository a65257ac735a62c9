//! The shallow water kernel. An alternate mode to the scalar wave model.
//!
//! State is `(h, u, v)`, advanced with one-sided *forward* differences:
//!
//!   h' = h - H0 * ((u_xp - u) / dx + (v_yp - v) / dy) * dt
//!   u' = u + (-g * (h_xp - h) / dx - k * u + f * v) * dt
//!   v' = v + (-g * (h_yp - h) / dy - k * v - f * u) * dt
//!
//! The forward differences make the scheme directionally asymmetric. That's a simplification
//! traded for a single-pass kernel, and the visuals were tuned against it, so it must not be
//! "fixed" into centred differences.
//!
//! Also note that all three updates read only previous values, unlike the scalar wave kernel.
//! Without enough drag the scheme slowly amplifies the shortest waves, which is why the host
//! checks every step for divergence.

use crate::cell::ShallowWaterCell;

/// Constants that don't change for the entirety of the simulation.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Zeroable, bytemuck::Pod)]
pub struct ShallowWaterConstants {
    /// The shape of the grid.
    pub dimensions: crate::grid::Dimensions,
    /// Grid spacing along x.
    pub dx: f32,
    /// Grid spacing along y.
    pub dy: f32,
    /// Timestep.
    pub dt: f32,
    /// Gravitational acceleration, `g`.
    pub gravity: f32,
    /// Linear drag coefficient, `k`.
    pub drag: f32,
    /// Coriolis-like coefficient, `f`.
    pub coriolis: f32,
    /// Reference depth of the water, `H0`.
    pub reference_depth: f32,
}

/// Advance the cell at `(x, y)` by one timestep, reading only from the previous buffer.
#[must_use]
#[expect(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    reason = "Grid dimensions are validated to fit in an `i32`"
)]
pub fn kernel(
    x: u32,
    y: u32,
    constants: &ShallowWaterConstants,
    previous: &[ShallowWaterCell],
) -> ShallowWaterCell {
    let dimensions = constants.dimensions;
    let (signed_x, signed_y) = (x as i32, y as i32);

    let here = previous[dimensions.index(x, y)];
    let x_plus = previous[dimensions.clamped_index(signed_x + 1, signed_y)];
    let y_plus = previous[dimensions.clamped_index(signed_x, signed_y + 1)];

    let ShallowWaterCell {
        height: h,
        velocity_x: u,
        velocity_y: v,
    } = here;
    let ShallowWaterConstants {
        dx,
        dy,
        dt,
        gravity: g,
        drag: k,
        coriolis: f,
        reference_depth,
        ..
    } = *constants;

    let divergence = (x_plus.velocity_x - u) / dx + (y_plus.velocity_y - v) / dy;
    let height = h - reference_depth * divergence * dt;
    let velocity_x = u + (-g * (x_plus.height - h) / dx - k * u + f * v) * dt;
    let velocity_y = v + (-g * (y_plus.height - h) / dy - k * v - f * u) * dt;

    ShallowWaterCell {
        height,
        velocity_x,
        velocity_y,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::Dimensions;

    fn constants() -> ShallowWaterConstants {
        ShallowWaterConstants {
            dimensions: Dimensions::new(3, 3),
            dx: 1.0,
            dy: 1.0,
            dt: 0.1,
            gravity: 10.0,
            drag: 0.5,
            coriolis: 0.25,
            reference_depth: 2.0,
        }
    }

    fn step(
        constants: &ShallowWaterConstants,
        previous: &[ShallowWaterCell],
    ) -> Vec<ShallowWaterCell> {
        (0..previous.len())
            .map(|index| {
                let (x, y) = constants.dimensions.coordinates(index);
                kernel(x, y, constants, previous)
            })
            .collect()
    }

    fn assert_close(left: f32, right: f32) {
        assert!((left - right).abs() < 1e-5, "{left} != {right}");
    }

    #[test]
    fn lake_at_rest_stays_at_rest() {
        let cells = vec![ShallowWaterCell::default(); 9];
        let next = step(&constants(), &cells);
        assert!(next.iter().all(|cell| *cell == ShallowWaterCell::default()));
    }

    #[test]
    fn uniform_current_feels_drag_and_coriolis() {
        let cells = vec![
            ShallowWaterCell {
                height: 0.0,
                velocity_x: 1.0,
                velocity_y: 0.0,
            };
            9
        ];
        let next = step(&constants(), &cells);
        for cell in next {
            // No divergence in a uniform flow.
            assert_close(cell.height, 0.0);
            // u' = 1 + (-k * 1) * dt
            assert_close(cell.velocity_x, 0.95);
            // v' = 0 + (-f * 1) * dt
            assert_close(cell.velocity_y, -0.025);
        }
    }

    #[test]
    fn matches_the_update_formulas() {
        let mut cells = vec![ShallowWaterCell::default(); 9];
        cells[4] = ShallowWaterCell {
            height: 0.5,
            velocity_x: 0.2,
            velocity_y: -0.1,
        };
        cells[5] = ShallowWaterCell {
            height: 0.3,
            velocity_x: 0.4,
            velocity_y: 0.0,
        };
        cells[7] = ShallowWaterCell {
            height: 0.1,
            velocity_x: 0.0,
            velocity_y: 0.3,
        };

        let next = step(&constants(), &cells);

        // h' = 0.5 - 2 * ((0.4 - 0.2) + (0.3 + 0.1)) * 0.1
        assert_close(next[4].height, 0.38);
        // u' = 0.2 + (-10 * (0.3 - 0.5) - 0.5 * 0.2 + 0.25 * -0.1) * 0.1
        assert_close(next[4].velocity_x, 0.3875);
        // v' = -0.1 + (-10 * (0.1 - 0.5) - 0.5 * -0.1 - 0.25 * 0.2) * 0.1
        assert_close(next[4].velocity_y, 0.3);
    }

    #[test]
    fn forward_differences_are_asymmetric() {
        let mut cells = vec![ShallowWaterCell::default(); 9];
        cells[4].height = 1.0;
        let next = step(&constants(), &cells);

        // The cell to the left of the bump sees it through its forward difference...
        assert_close(next[3].velocity_x, -10.0 * 1.0 * 0.1);
        // ...but the cell to the right only sees its own clamped neighbour.
        assert_close(next[5].velocity_x, 0.0);
        // Likewise vertically.
        assert_close(next[1].velocity_y, -1.0);
        assert_close(next[7].velocity_y, 0.0);
    }
}
