//! World generation configuration
//!
//! All knobs the generator recognizes, loadable from a JSON file. Defaults
//! reproduce the reference world: a 63x63-chunk disc of 64-cell chunks with
//! plains, hills, and mountains fading in from three fixed origins.

use serde::{Deserialize, Serialize};

use crate::biomes::BiomeLayer;
use crate::erosion::SimulationParams;
use crate::noise_field::NoiseParams;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side of one chunk in grid cells (must be even)
    pub chunk_size: usize,
    /// World radius in tiles; the world spans `2 * world_radius + 1` chunks
    pub world_radius: i32,
    pub plains: BiomeLayer,
    pub hills: BiomeLayer,
    pub mountains: BiomeLayer,
    pub erosion: SimulationParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64,
            world_radius: 31,
            plains: BiomeLayer {
                noise: NoiseParams {
                    seed: None,
                    frequency: 48.0,
                    wavelength: 8192.0,
                    value_range: (-16.0, 16.0),
                    octaves: 5,
                    persistence: 0.5,
                    lacunarity: 2.0,
                },
                origin: (1, 2),
            },
            hills: BiomeLayer {
                noise: NoiseParams {
                    seed: None,
                    frequency: 24.0,
                    wavelength: 8192.0,
                    value_range: (-8.0, 56.0),
                    octaves: 5,
                    persistence: 0.5,
                    lacunarity: 2.0,
                },
                origin: (-1, 1),
            },
            mountains: BiomeLayer {
                noise: NoiseParams {
                    seed: None,
                    frequency: 20.0,
                    wavelength: 8192.0,
                    value_range: (0.0, 384.0),
                    octaves: 6,
                    persistence: 0.5,
                    lacunarity: 2.0,
                },
                origin: (0, 0),
            },
            erosion: SimulationParams::default(),
        }
    }
}

impl WorldConfig {
    /// World side in chunks.
    pub fn world_size(&self) -> usize {
        2 * self.world_radius as usize + 1
    }

    /// Height-field side in grid cells.
    pub fn grid_side(&self) -> usize {
        self.chunk_size * self.world_size() + 1
    }

    /// Load a configuration from a JSON file. Missing fields fall back to
    /// their defaults.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
