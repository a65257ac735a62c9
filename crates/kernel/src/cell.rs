//! The contents of a single grid cell for each of the integrator variants.
//!
//! The variants deliberately don't share a layout: the scalar wave model carries one velocity,
//! the shallow water model carries a directional velocity.

/// Behaviour common to every cell layout.
pub trait Cell: Copy + Default + Send + Sync + bytemuck::Pod {
    /// The height of the water surface.
    fn height(&self) -> f32;

    /// Raise (or lower) the water surface.
    fn add_height(&mut self, amount: f32);

    /// The energy-like quantity `h² + |velocity|²`.
    fn energy(&self) -> f32;

    /// Are all the components finite?
    fn is_finite(&self) -> bool;

    /// Reset non-finite components to zero and clamp the rest to `±limit`. Returns whether
    /// anything was changed.
    fn repair(&mut self, limit: f32) -> bool;
}

/// A cell of the scalar wave model.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Zeroable, bytemuck::Pod)]
pub struct WaveCell {
    /// Height of the surface.
    pub height: f32,
    /// Vertical velocity of the surface.
    pub velocity: f32,
}

/// A cell of the shallow water model.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Zeroable, bytemuck::Pod)]
pub struct ShallowWaterCell {
    /// Height of the surface above the reference depth.
    pub height: f32,
    /// Velocity along x.
    pub velocity_x: f32,
    /// Velocity along y.
    pub velocity_y: f32,
}

impl Cell for WaveCell {
    fn height(&self) -> f32 {
        self.height
    }

    fn add_height(&mut self, amount: f32) {
        self.height += amount;
    }

    fn energy(&self) -> f32 {
        (self.height * self.height) + (self.velocity * self.velocity)
    }

    fn is_finite(&self) -> bool {
        self.height.is_finite() && self.velocity.is_finite()
    }

    fn repair(&mut self, limit: f32) -> bool {
        let before = *self;
        self.height = repair_component(self.height, limit);
        self.velocity = repair_component(self.velocity, limit);
        before != *self
    }
}

impl Cell for ShallowWaterCell {
    fn height(&self) -> f32 {
        self.height
    }

    fn add_height(&mut self, amount: f32) {
        self.height += amount;
    }

    fn energy(&self) -> f32 {
        (self.height * self.height)
            + (self.velocity_x * self.velocity_x)
            + (self.velocity_y * self.velocity_y)
    }

    fn is_finite(&self) -> bool {
        self.height.is_finite() && self.velocity_x.is_finite() && self.velocity_y.is_finite()
    }

    fn repair(&mut self, limit: f32) -> bool {
        let before = *self;
        self.height = repair_component(self.height, limit);
        self.velocity_x = repair_component(self.velocity_x, limit);
        self.velocity_y = repair_component(self.velocity_y, limit);
        before != *self
    }
}

/// Zero out `NaN`s and clamp everything else, infinities included.
fn repair_component(value: f32, limit: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-limit, limit)
    }
}

#[expect(clippy::float_cmp, reason = "The values are exact")]
#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn energy_sums_squares() {
        let wave = WaveCell {
            height: 2.0,
            velocity: -1.0,
        };
        assert_eq!(wave.energy(), 5.0);

        let shallow = ShallowWaterCell {
            height: 1.0,
            velocity_x: 2.0,
            velocity_y: -2.0,
        };
        assert_eq!(shallow.energy(), 9.0);
    }

    #[test]
    fn repair_zeroes_nans_and_clamps_infinities() {
        let mut cell = ShallowWaterCell {
            height: f32::NAN,
            velocity_x: f32::INFINITY,
            velocity_y: 0.5,
        };
        assert!(!cell.is_finite());
        assert!(cell.repair(10.0));
        assert_eq!(
            cell,
            ShallowWaterCell {
                height: 0.0,
                velocity_x: 10.0,
                velocity_y: 0.5,
            }
        );
        assert!(cell.is_finite());
        assert!(!cell.repair(10.0));
    }
}
