//! Coherent-noise field generation
//!
//! The generator pipeline treats noise as an external collaborator: anything
//! that can produce a square scalar grid from `NoiseParams` works. The
//! shipped implementation layers Perlin octaves (fBm) and remaps the result
//! into the requested value range.

use noise::{NoiseFn, Perlin, Seedable};
use serde::{Deserialize, Serialize};

use crate::tilemap::Tilemap;

/// Parameters for one noise layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    /// Explicit seed; `None` draws a random seed per call
    pub seed: Option<u64>,
    /// Number of base waves across one wavelength
    pub frequency: f64,
    /// Spatial extent of one noise period, in grid cells
    pub wavelength: f64,
    /// Output range the raw [-1, 1] noise is mapped to
    pub value_range: (f32, f32),
    /// Number of octaves
    pub octaves: u32,
    /// Amplitude decay per octave (0.0-1.0)
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: None,
            frequency: 8.0,
            wavelength: 128.0,
            value_range: (-0.5, 0.5),
            octaves: 8,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Source of square scalar noise grids. Deterministic for a fixed seed.
pub trait NoiseSource {
    fn generate(&self, grid_side: usize, params: &NoiseParams) -> Tilemap<f32>;
}

/// Perlin fBm noise source backed by the `noise` crate.
pub struct PerlinNoiseSource;

impl NoiseSource for PerlinNoiseSource {
    fn generate(&self, grid_side: usize, params: &NoiseParams) -> Tilemap<f32> {
        let seed = params.seed.unwrap_or_else(rand::random);
        let perlin = Perlin::new(1).set_seed(seed as u32);

        let step = params.frequency / params.wavelength;
        let (lo, hi) = params.value_range;

        Tilemap::from_fn(grid_side, |x, y| {
            let n = fbm(
                &perlin,
                x as f64 * step,
                y as f64 * step,
                params.octaves,
                params.persistence,
                params.lacunarity,
            );
            // Map [-1, 1] to the requested range
            let t = (n as f32 + 1.0) * 0.5;
            lo + t * (hi - lo)
        })
    }
}

/// Constant-valued noise source. Used by tests and the zero-noise scenarios.
pub struct ConstantNoise(pub f32);

impl NoiseSource for ConstantNoise {
    fn generate(&self, grid_side: usize, _params: &NoiseParams) -> Tilemap<f32> {
        Tilemap::new_with(grid_side, grid_side, self.0)
    }
}

/// Fractional Brownian Motion - multi-octave noise, normalized to [-1, 1].
fn fbm(
    noise: &Perlin,
    x: f64,
    y: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total / max_value
}
