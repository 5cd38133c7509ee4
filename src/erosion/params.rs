//! Erosion simulation parameters

use serde::{Deserialize, Serialize};

/// Parameters for the droplet erosion simulation. Shared read-only across
/// all concurrently running droplets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Number of droplets per grid cell; total droplet count is
    /// `side * side * droplets_per_unit_area`
    pub droplets_per_unit_area: f32,

    /// Maximum path length (steps) per droplet
    pub max_steps: usize,

    /// Gravity factor for the velocity update. Negative: moving downhill
    /// (negative height delta) speeds the droplet up
    pub gravity: f32,

    /// Fraction of the capacity surplus/deficit moved per step (0.0-1.0)
    pub erosion_rate: f32,

    /// Floor for sediment capacity; keeps slow droplets on flat ground
    /// carrying a little sediment instead of none
    pub min_sediment: f32,

    /// Momentum conservation factor (0.0-1.0). Higher values keep droplets
    /// moving in their current direction across small gradient changes
    pub inertia: f32,

    /// Sediment capacity multiplier (capacity = slope * velocity * water * factor)
    pub capacity_factor: f32,

    /// Radius of the erosion brush, in cells
    pub brush_radius: usize,

    /// Water evaporation rate per step (0.0-1.0)
    pub evaporate_speed: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            droplets_per_unit_area: 0.05,
            max_steps: 64,
            gravity: -4.0,
            erosion_rate: 0.3,
            min_sediment: 0.01,
            inertia: 0.3,
            capacity_factor: 8.0,
            brush_radius: 3,
            evaporate_speed: 0.01,
        }
    }
}

impl SimulationParams {
    /// Lighter configuration for tests and debug tools.
    pub fn fast() -> Self {
        Self {
            droplets_per_unit_area: 0.01,
            max_steps: 32,
            ..Default::default()
        }
    }

    /// Heavier carving: more droplets, faster sediment exchange.
    pub fn dramatic() -> Self {
        Self {
            droplets_per_unit_area: 0.15,
            erosion_rate: 0.5,
            capacity_factor: 12.0,
            ..Default::default()
        }
    }

    /// Exclusion radius used by admission control: the farthest any part of
    /// a droplet's footprint can lie from its starting position.
    pub fn exclusion_radius(&self) -> f32 {
        (self.max_steps + self.brush_radius) as f32
    }

    /// Total droplet count for a square grid of the given side.
    pub fn droplet_count(&self, side: usize) -> usize {
        ((side * side) as f32 * self.droplets_per_unit_area) as usize
    }
}
