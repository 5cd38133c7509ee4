use std::time::Instant;

use clap::Parser;

use terrain_generator::biomes;
use terrain_generator::chunks::{self, MemorySink};
use terrain_generator::config::WorldConfig;
use terrain_generator::erosion;
use terrain_generator::export;
use terrain_generator::noise_field::PerlinNoiseSource;
use terrain_generator::river_sand;
use terrain_generator::seeds::WorldSeeds;

#[derive(Parser, Debug)]
#[command(name = "terrain_generator")]
#[command(about = "Generate a tiled terrain world with droplet-eroded biomes")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Path to a JSON world configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Chunk side in cells (overrides config)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// World radius in tiles (overrides config)
    #[arg(long)]
    world_radius: Option<i32>,

    /// Droplets per grid cell (overrides config)
    #[arg(long)]
    droplets: Option<f32>,

    /// Skip the erosion pass
    #[arg(long)]
    no_erosion: bool,

    /// Output directory for PNG map exports
    #[arg(short, long, default_value = "out")]
    output: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(world_radius) = args.world_radius {
        config.world_radius = world_radius;
    }
    if let Some(droplets) = args.droplets {
        config.erosion.droplets_per_unit_area = droplets;
    }
    if args.no_erosion {
        config.erosion.droplets_per_unit_area = 0.0;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    let seeds = WorldSeeds::from_master(seed);
    let side = config.grid_side();

    println!("Generating world with seed: {}", seed);
    println!(
        "World: {} chunks of {} cells ({}x{} grid)",
        config.world_size(),
        config.chunk_size,
        side,
        side
    );

    std::fs::create_dir_all(&args.output)?;

    // Blend biome layers into the base height field
    println!("Blending biome layers...");
    let t = Instant::now();
    let (base, mut influence) = biomes::blend_biomes(
        config.chunk_size,
        config.world_size(),
        &config.plains,
        &config.hills,
        &config.mountains,
        &PerlinNoiseSource,
        &seeds,
    );
    let (min_h, max_h) = base.min_max();
    println!(
        "Base terrain in {:.2}s, height range {:.1} to {:.1}",
        t.elapsed().as_secs_f32(),
        min_h,
        max_h
    );

    // Erode
    let mut heightmap = base.clone();
    println!(
        "Simulating erosion ({} droplets)...",
        config.erosion.droplet_count(side)
    );
    let t = Instant::now();
    let stats = erosion::simulate(&mut heightmap, &config.erosion, seeds.erosion);
    println!(
        "Erosion in {:.2}s: eroded {:.1}, deposited {:.1}",
        t.elapsed().as_secs_f32(),
        stats.total_eroded,
        stats.total_deposited
    );
    println!(
        "  droplets: {} full-run, {} stalled, {} flat, {} left grid, {} brush-clipped",
        stats.completed, stats.stalled, stats.degenerate, stats.exited_bounds, stats.brush_clipped
    );

    // Derive overlays from the erosion delta
    let (rivers, sand) = river_sand::derive_river_sand(&base, &heightmap);
    influence.rivers = rivers;
    influence.sand = sand;

    // Slice into tiles
    println!("Extracting tiles...");
    let t = Instant::now();
    let tiles = chunks::extract_tiles(
        &heightmap,
        &influence,
        config.chunk_size,
        config.world_radius,
    );
    let tile_count = tiles.len();
    let vertex_count: usize = tiles.iter().map(|t| t.vertices.len()).sum();
    let mut sink = MemorySink::default();
    chunks::deliver_tiles(tiles, &mut sink);
    println!(
        "Prepared {} tiles ({} vertices) in {:.2}s",
        tile_count,
        vertex_count,
        t.elapsed().as_secs_f32()
    );

    // Map exports
    export::export_shaded(&heightmap, &format!("{}/heightmap.png", args.output))?;
    export::export_heightmap(&base, &format!("{}/base_heightmap.png", args.output))?;
    export::export_color_map(&influence, &format!("{}/color_map.png", args.output))?;
    export::export_influence_map(&influence.rivers, &format!("{}/rivers.png", args.output))?;
    export::export_influence_map(&influence.sand, &format!("{}/sand.png", args.output))?;
    println!("Saved maps to {}/", args.output);

    Ok(())
}
