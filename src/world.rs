//! Full generation pipeline
//!
//! Blend biome layers into a base height field, erode it, derive the river
//! and sand overlays from the erosion delta, then slice the world into
//! tiles and hand them to the scene sink.

use crate::biomes::{self, InfluenceMaps};
use crate::chunks::{self, SceneSink};
use crate::config::WorldConfig;
use crate::erosion::{self, ErosionStats};
use crate::noise_field::NoiseSource;
use crate::river_sand;
use crate::seeds::WorldSeeds;
use crate::tilemap::Tilemap;

/// Everything a generation pass produces besides the tiles already handed
/// to the sink.
pub struct GeneratedWorld {
    /// Height field before erosion
    pub base_heightmap: Tilemap<f32>,
    /// Height field after erosion
    pub heightmap: Tilemap<f32>,
    /// All five influence maps, rivers and sand filled in
    pub influence: InfluenceMaps,
    pub stats: ErosionStats,
    pub tile_count: usize,
}

/// Run the whole pipeline once.
pub fn generate(
    config: &WorldConfig,
    seeds: &WorldSeeds,
    source: &dyn NoiseSource,
    sink: &mut dyn SceneSink,
) -> GeneratedWorld {
    let (base, mut influence) = biomes::blend_biomes(
        config.chunk_size,
        config.world_size(),
        &config.plains,
        &config.hills,
        &config.mountains,
        source,
        seeds,
    );

    let mut heightmap = base.clone();
    let stats = erosion::simulate(&mut heightmap, &config.erosion, seeds.erosion);

    let (rivers, sand) = river_sand::derive_river_sand(&base, &heightmap);
    influence.rivers = rivers;
    influence.sand = sand;

    let tiles = chunks::extract_tiles(
        &heightmap,
        &influence,
        config.chunk_size,
        config.world_radius,
    );
    let tile_count = tiles.len();
    chunks::deliver_tiles(tiles, sink);

    GeneratedWorld {
        base_heightmap: base,
        heightmap,
        influence,
        stats,
        tile_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunks::MemorySink;
    use crate::erosion::SimulationParams;
    use crate::noise_field::{ConstantNoise, PerlinNoiseSource};

    #[test]
    fn test_zero_world_single_flat_tile() {
        // chunk 4, radius 0, zero noise, no droplets: one tile, every
        // height exactly 0, rivers and sand identically zero.
        let config = WorldConfig {
            chunk_size: 4,
            world_radius: 0,
            erosion: SimulationParams {
                droplets_per_unit_area: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let seeds = WorldSeeds::from_master(1);
        let mut sink = MemorySink::default();

        let world = generate(&config, &seeds, &ConstantNoise(0.0), &mut sink);

        assert_eq!(world.tile_count, 1);
        assert_eq!(sink.tiles.len(), 1);
        for (_, _, &h) in world.heightmap.iter() {
            assert_eq!(h, 0.0);
        }
        for (_, vertices, _, colors) in &sink.tiles {
            for v in vertices {
                assert_eq!(v[2], 0.0);
            }
            assert_eq!(colors.len(), vertices.len());
        }
        for (_, _, &r) in world.influence.rivers.iter() {
            assert_eq!(r, 0.0);
        }
        assert_eq!(world.stats.droplets, 0);
    }

    #[test]
    fn test_full_pipeline_with_erosion() {
        let config = WorldConfig {
            chunk_size: 16,
            world_radius: 0,
            erosion: SimulationParams {
                droplets_per_unit_area: 0.05,
                max_steps: 8,
                brush_radius: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let seeds = WorldSeeds::from_master(77);
        let mut sink = MemorySink::default();

        let world = generate(&config, &seeds, &PerlinNoiseSource, &mut sink);

        assert_eq!(world.tile_count, 1);
        assert_eq!(world.heightmap.width, 17);
        assert!(world.stats.droplets > 0);
        // Overlays derived from the delta stay in range
        for (_, _, &v) in world.influence.rivers.iter() {
            assert!((0.0..=1.0).contains(&v));
        }
        for (_, _, &v) in world.influence.sand.iter() {
            assert!((0.0..=1.0).contains(&v));
        }
        // The base field is retained untouched alongside the eroded one
        assert_eq!(world.base_heightmap.width, world.heightmap.width);
    }
}
