//! Biome influence blending
//!
//! Each biome gets a spatial influence weight derived from a radial distance
//! field around its origin, pushed through a sigmoid falloff. The base
//! height field is the influence-weighted sum of the per-biome noise layers.
//!
//! The biome set is closed: plains, hills, and mountains are authored here,
//! rivers and sand are filled in after erosion from the erosion delta.

use serde::{Deserialize, Serialize};

use crate::noise_field::{NoiseParams, NoiseSource};
use crate::seeds::WorldSeeds;
use crate::tilemap::Tilemap;

// Falloff constants per biome. The midpoint scales with world size and the
// steepness is its reciprocal, so biome footprints grow with the world.
const PLAINS_FALLOFF_A: f32 = 3.0;
const PLAINS_MIDPOINT: f32 = 16.0;
const HILLS_FALLOFF_A: f32 = 1.5;
const HILLS_MIDPOINT: f32 = 32.0;

/// Configuration of one authored biome layer: its noise parameters and the
/// origin of its distance field, in chunk units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeLayer {
    pub noise: NoiseParams,
    pub origin: (i32, i32),
}

/// Named influence maps, one per biome, all sharing the height field's
/// dimensions. Values are conceptually [0, 1]; `hills` is derived by
/// subtraction and may dip below zero, so consumers clamp when blending.
#[derive(Clone)]
pub struct InfluenceMaps {
    pub plains: Tilemap<f32>,
    pub hills: Tilemap<f32>,
    pub mountains: Tilemap<f32>,
    pub rivers: Tilemap<f32>,
    pub sand: Tilemap<f32>,
}

impl InfluenceMaps {
    pub fn side(&self) -> usize {
        self.plains.width
    }
}

/// Radial distance field for a biome origin. Grid indices are centered so
/// index 0 maps to `-side/2`; the origin is given in chunk units.
pub fn distance_map(chunk_size: usize, world_size: usize, origin: (i32, i32)) -> Tilemap<f32> {
    let side = chunk_size * world_size + 1;
    let half = (side / 2) as i32;
    let ox = origin.0 * chunk_size as i32;
    let oy = origin.1 * chunk_size as i32;

    Tilemap::from_fn(side, |x, y| {
        let dx = (x as i32 - half - ox) as f32;
        let dy = (y as i32 - half - oy) as f32;
        (dx * dx + dy * dy).sqrt() * std::f32::consts::SQRT_2
    })
}

/// Sigmoid with base `a`, midpoint `s`, and steepness `k`. Monotonically
/// increasing in `d` for `a > 1, k > 0`.
pub fn sigmoid(d: f32, a: f32, s: f32, k: f32) -> f32 {
    1.0 / (1.0 + a.powf(-(k * (d - s))))
}

/// Influence from distance: 1 at the origin, falling off through the
/// sigmoid midpoint as distance grows.
fn falloff(distances: &Tilemap<f32>, a: f32, s: f32, k: f32) -> Tilemap<f32> {
    let mut result = distances.clone();
    for (_, _, v) in result.iter_mut() {
        *v = 1.0 - sigmoid(*v, a, s, k);
    }
    result
}

/// Blend the three authored biomes into a base height field plus influence
/// maps. The derivation order is fixed: mountains complement the raw hills
/// influence *before* plains are subtracted out of hills; swapping the two
/// steps moves the biome boundaries.
pub fn blend_biomes(
    chunk_size: usize,
    world_size: usize,
    plains: &BiomeLayer,
    hills: &BiomeLayer,
    mountains: &BiomeLayer,
    source: &dyn NoiseSource,
    seeds: &WorldSeeds,
) -> (Tilemap<f32>, InfluenceMaps) {
    let side = chunk_size * world_size + 1;
    let ws = world_size as f32;

    let plains_noise = source.generate(side, &seeded(&plains.noise, seeds.plains));
    let hills_noise = source.generate(side, &seeded(&hills.noise, seeds.hills));
    let mountains_noise = source.generate(side, &seeded(&mountains.noise, seeds.mountains));

    let plains_inf = falloff(
        &distance_map(chunk_size, world_size, plains.origin),
        PLAINS_FALLOFF_A,
        PLAINS_MIDPOINT * ws,
        1.0 / ws,
    );
    let hills_raw = falloff(
        &distance_map(chunk_size, world_size, hills.origin),
        HILLS_FALLOFF_A,
        HILLS_MIDPOINT * ws,
        1.0 / ws,
    );

    let mut mountains_inf = Tilemap::new_with(side, side, 0.0f32);
    let mut hills_inf = Tilemap::new_with(side, side, 0.0f32);
    for y in 0..side {
        for x in 0..side {
            let raw = *hills_raw.get(x, y);
            mountains_inf.set(x, y, 1.0 - raw);
            hills_inf.set(x, y, raw - *plains_inf.get(x, y));
        }
    }

    let heightmap = Tilemap::from_fn(side, |x, y| {
        *plains_noise.get(x, y) * *plains_inf.get(x, y)
            + *hills_noise.get(x, y) * *hills_inf.get(x, y)
            + *mountains_noise.get(x, y) * *mountains_inf.get(x, y)
    });

    let influence = InfluenceMaps {
        plains: plains_inf,
        hills: hills_inf,
        mountains: mountains_inf,
        rivers: Tilemap::new_with(side, side, 0.0),
        sand: Tilemap::new_with(side, side, 0.0),
    };

    (heightmap, influence)
}

/// Fill an unset layer seed from the derived world seeds.
fn seeded(params: &NoiseParams, fallback: u64) -> NoiseParams {
    NoiseParams {
        seed: Some(params.seed.unwrap_or(fallback)),
        ..*params
    }
}
