//! Tile extraction
//!
//! Slices the finished height field and influence maps into per-tile
//! subgrids, builds vertex/face/color buffers for each tile, and hands them
//! to the scene sink. Tile buffers are prepared in parallel; sink calls
//! happen sequentially on the calling thread because the sink owns external
//! scene state.

use rayon::prelude::*;

use crate::biomes::InfluenceMaps;
use crate::tilemap::Tilemap;

pub const PLAINS_COLOR: [f32; 4] = [0.25, 0.55, 0.20, 1.0];
pub const HILLS_COLOR: [f32; 4] = [0.45, 0.33, 0.20, 1.0];
pub const MOUNTAINS_COLOR: [f32; 4] = [0.55, 0.55, 0.55, 1.0];
pub const RIVER_COLOR: [f32; 4] = [0.40, 0.45, 0.50, 1.0];
pub const SAND_COLOR: [f32; 4] = [0.85, 0.78, 0.50, 1.0];

/// Receiver for finished tile buffers. Implementations own the scene; calls
/// arrive one at a time on the thread that runs the extraction, and a tile
/// name is never submitted twice within one generation pass.
pub trait SceneSink {
    fn add_tile(
        &mut self,
        name: &str,
        vertices: &[[f32; 3]],
        faces: &[[u32; 4]],
        colors: &[[f32; 4]],
    );
}

/// In-memory sink retaining every submitted tile. Used by tests and tools.
#[derive(Default)]
pub struct MemorySink {
    pub tiles: Vec<(String, Vec<[f32; 3]>, Vec<[u32; 4]>, Vec<[f32; 4]>)>,
}

impl SceneSink for MemorySink {
    fn add_tile(
        &mut self,
        name: &str,
        vertices: &[[f32; 3]],
        faces: &[[u32; 4]],
        colors: &[[f32; 4]],
    ) {
        self.tiles
            .push((name.to_string(), vertices.to_vec(), faces.to_vec(), colors.to_vec()));
    }
}

/// One extracted tile: the height subgrid plus the render buffers derived
/// from it. Handed to the sink and then discarded.
pub struct Tile {
    pub coord: (i32, i32),
    pub name: String,
    pub heights: Tilemap<f32>,
    pub vertices: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 4]>,
    pub colors: Vec<[f32; 4]>,
}

/// Tile coordinates inside the approximately circular world boundary.
pub fn tile_coords(world_radius: i32) -> Vec<(i32, i32)> {
    let mut coords = Vec::new();
    for x in -world_radius..=world_radius {
        for y in -world_radius..=world_radius {
            let dist = ((x * x + y * y) as f64).sqrt();
            if (dist - 0.75).ceil() as i32 <= world_radius {
                coords.push((x, y));
            }
        }
    }
    coords
}

/// Extract every tile inside the world boundary, building buffers in
/// parallel. `heightmap` and all influence maps must share the side
/// `chunk_size * (2 * world_radius + 1) + 1`.
pub fn extract_tiles(
    heightmap: &Tilemap<f32>,
    influence: &InfluenceMaps,
    chunk_size: usize,
    world_radius: i32,
) -> Vec<Tile> {
    assert!(chunk_size % 2 == 0, "chunk size must be even");
    let world_side = chunk_size * (2 * world_radius as usize + 1) + 1;
    assert_eq!(heightmap.width, world_side, "height field side mismatch");
    assert_eq!(influence.side(), world_side);

    tile_coords(world_radius)
        .into_par_iter()
        .map(|coord| build_tile(heightmap, influence, chunk_size, coord))
        .collect()
}

/// Hand the tiles to the sink, one at a time, consuming them.
pub fn deliver_tiles(tiles: Vec<Tile>, sink: &mut dyn SceneSink) {
    for tile in tiles {
        sink.add_tile(&tile.name, &tile.vertices, &tile.faces, &tile.colors);
    }
}

/// Build one tile's subgrids and buffers.
///
/// Subgrid side is `chunk_size + 1`: adjacent tiles overlap in exactly one
/// shared row/column of vertices, so the meshes seam without gaps.
fn build_tile(
    heightmap: &Tilemap<f32>,
    influence: &InfluenceMaps,
    chunk_size: usize,
    coord: (i32, i32),
) -> Tile {
    let grid_side = chunk_size + 1;
    let half = (heightmap.width / 2) as i32;
    let chunk = chunk_size as i32;

    let x_start = coord.0 * chunk - chunk / 2 + half;
    let y_start = coord.1 * chunk - chunk / 2 + half;

    let heights = Tilemap::from_fn(grid_side, |lx, ly| {
        *heightmap.get((x_start + lx as i32) as usize, (y_start + ly as i32) as usize)
    });

    // World-space vertex positions: the tile is centered on its chunk
    // origin, one grid cell per world unit.
    let half_chunk = (chunk_size / 2) as f32;
    let origin_x = (coord.0 * chunk) as f32;
    let origin_y = (coord.1 * chunk) as f32;

    let mut vertices = Vec::with_capacity(grid_side * grid_side);
    let mut colors = Vec::with_capacity(grid_side * grid_side);
    for ly in 0..grid_side {
        for lx in 0..grid_side {
            vertices.push([
                origin_x - half_chunk + lx as f32,
                origin_y - half_chunk + ly as f32,
                *heights.get(lx, ly),
            ]);
            let wx = (x_start + lx as i32) as usize;
            let wy = (y_start + ly as i32) as usize;
            colors.push(vertex_color(influence, wx, wy));
        }
    }

    let mut faces = Vec::with_capacity((grid_side - 1) * (grid_side - 1));
    for ly in 0..grid_side - 1 {
        for lx in 0..grid_side - 1 {
            let i = (lx + ly * grid_side) as u32;
            let side = grid_side as u32;
            faces.push([i, i + 1, i + side + 1, i + side]);
        }
    }

    Tile {
        coord,
        name: format!("tile_{}_{}", coord.0, coord.1),
        heights,
        vertices,
        faces,
        colors,
    }
}

/// Blend the biome base colors by their clamped influences, then overlay
/// river and sand.
pub fn vertex_color(influence: &InfluenceMaps, x: usize, y: usize) -> [f32; 4] {
    let p = influence.plains.get(x, y).clamp(0.0, 1.0);
    let h = influence.hills.get(x, y).clamp(0.0, 1.0);
    let m = influence.mountains.get(x, y).clamp(0.0, 1.0);
    let r = influence.rivers.get(x, y).clamp(0.0, 1.0);
    let s = influence.sand.get(x, y).clamp(0.0, 1.0);

    let mut color = [0.0f32; 4];
    let base_weight = 1.0 - r - s;
    for c in 0..4 {
        let base = PLAINS_COLOR[c] * p + HILLS_COLOR[c] * h + MOUNTAINS_COLOR[c] * m;
        color[c] = base * base_weight + RIVER_COLOR[c] * r + SAND_COLOR[c] * s;
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomes::{blend_biomes, BiomeLayer};
    use crate::noise_field::{ConstantNoise, NoiseParams};
    use crate::seeds::WorldSeeds;

    fn test_world(chunk_size: usize, world_radius: i32) -> (Tilemap<f32>, InfluenceMaps) {
        let layer = |origin| BiomeLayer {
            noise: NoiseParams::default(),
            origin,
        };
        let world_size = 2 * world_radius as usize + 1;
        let (mut heightmap, influence) = blend_biomes(
            chunk_size,
            world_size,
            &layer((1, 2)),
            &layer((-1, 1)),
            &layer((0, 0)),
            &ConstantNoise(0.0),
            &WorldSeeds::from_master(1),
        );
        // Distinct heights per cell so border comparisons are meaningful
        for (x, y, h) in heightmap.iter_mut() {
            *h = (x * 1000 + y) as f32;
        }
        (heightmap, influence)
    }

    #[test]
    fn test_world_boundary_filter() {
        assert_eq!(tile_coords(0), vec![(0, 0)]);
        // Radius 1 keeps the full 3x3 block (corner distance ~1.41 rounds in)
        assert_eq!(tile_coords(1).len(), 9);
        // Radius 2 drops the four far corners of the 5x5 block
        let coords = tile_coords(2);
        assert_eq!(coords.len(), 21);
        assert!(!coords.contains(&(2, 2)));
        assert!(coords.contains(&(2, 0)));
    }

    #[test]
    fn test_adjacent_tiles_share_border_column() {
        let (heightmap, influence) = test_world(4, 1);
        let tiles = extract_tiles(&heightmap, &influence, 4, 1);

        let find = |c: (i32, i32)| tiles.iter().find(|t| t.coord == c).unwrap();
        let left = find((0, 0));
        let right = find((1, 0));

        let side = 5;
        for ly in 0..side {
            assert_eq!(
                *left.heights.get(side - 1, ly),
                *right.heights.get(0, ly),
                "border mismatch at row {}",
                ly
            );
        }

        let below = find((0, 1));
        for lx in 0..side {
            assert_eq!(*left.heights.get(lx, side - 1), *below.heights.get(lx, 0));
        }
    }

    #[test]
    fn test_tiles_cover_grid_without_gaps() {
        // Stitching all tiles back together must reproduce the full field.
        let (heightmap, influence) = test_world(4, 1);
        let tiles = extract_tiles(&heightmap, &influence, 4, 1);

        let mut seen = Tilemap::new_with(heightmap.width, heightmap.height, false);
        let half = (heightmap.width / 2) as i32;
        for tile in &tiles {
            let x_start = tile.coord.0 * 4 - 2 + half;
            let y_start = tile.coord.1 * 4 - 2 + half;
            for ly in 0..5usize {
                for lx in 0..5usize {
                    let wx = (x_start + lx as i32) as usize;
                    let wy = (y_start + ly as i32) as usize;
                    assert_eq!(*tile.heights.get(lx, ly), *heightmap.get(wx, wy));
                    seen.set(wx, wy, true);
                }
            }
        }
        for (_, _, &covered) in seen.iter() {
            assert!(covered);
        }
    }

    #[test]
    fn test_face_topology() {
        let (heightmap, influence) = test_world(4, 0);
        let tiles = extract_tiles(&heightmap, &influence, 4, 0);
        let tile = &tiles[0];

        assert_eq!(tile.vertices.len(), 25);
        assert_eq!(tile.faces.len(), 16);
        for face in &tile.faces {
            for &idx in face {
                assert!((idx as usize) < tile.vertices.len());
            }
        }
        // First quad connects the top-left cell in winding order
        assert_eq!(tile.faces[0], [0, 1, 6, 5]);
    }

    #[test]
    fn test_vertex_world_positions() {
        let (heightmap, influence) = test_world(4, 1);
        let tiles = extract_tiles(&heightmap, &influence, 4, 1);
        let tile = tiles.iter().find(|t| t.coord == (1, 0)).unwrap();

        // Tile (1, 0): chunk origin at x=4, grid spans [2, 6] in world x
        assert_eq!(tile.vertices[0][0], 2.0);
        assert_eq!(tile.vertices[0][1], -2.0);
        let last = tile.vertices.last().unwrap();
        assert_eq!(last[0], 6.0);
        assert_eq!(last[1], 2.0);
    }

    #[test]
    fn test_single_tile_zero_world() {
        // chunk 4, radius 0, zero noise, no erosion: one tile, flat zero
        // heights, colors matching the influence blend formula exactly.
        let layer = |origin| BiomeLayer {
            noise: NoiseParams::default(),
            origin,
        };
        let (heightmap, influence) = blend_biomes(
            4,
            1,
            &layer((1, 2)),
            &layer((-1, 1)),
            &layer((0, 0)),
            &ConstantNoise(0.0),
            &WorldSeeds::from_master(42),
        );

        let tiles = extract_tiles(&heightmap, &influence, 4, 0);
        assert_eq!(tiles.len(), 1);
        let tile = &tiles[0];
        assert_eq!(tile.name, "tile_0_0");

        for v in &tile.vertices {
            assert_eq!(v[2], 0.0);
        }

        let half = (heightmap.width / 2) as i32;
        for (i, color) in tile.colors.iter().enumerate() {
            let lx = i % 5;
            let ly = i / 5;
            let wx = (-2 + half + lx as i32) as usize;
            let wy = (-2 + half + ly as i32) as usize;
            let expected = vertex_color(&influence, wx, wy);
            assert_eq!(*color, expected);
        }
    }

    #[test]
    fn test_deliver_hands_every_tile_once() {
        let (heightmap, influence) = test_world(4, 1);
        let tiles = extract_tiles(&heightmap, &influence, 4, 1);
        let count = tiles.len();

        let mut sink = MemorySink::default();
        deliver_tiles(tiles, &mut sink);

        assert_eq!(sink.tiles.len(), count);
        let mut names: Vec<_> = sink.tiles.iter().map(|t| t.0.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
    }
}
