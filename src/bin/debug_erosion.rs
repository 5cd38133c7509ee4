//! Debug tool for comparing erosion parameters visually
//! Renders a grid of shaded heightmaps with different erosion settings

use image::{ImageBuffer, RgbImage};
use terrain_generator::biomes;
use terrain_generator::config::WorldConfig;
use terrain_generator::erosion::{self, SimulationParams};
use terrain_generator::export;
use terrain_generator::noise_field::PerlinNoiseSource;
use terrain_generator::seeds::WorldSeeds;

const SEED: u64 = 42;
const COLUMNS: usize = 3;

fn main() {
    println!("Generating erosion comparison grid (seed {})...", SEED);

    let config = WorldConfig {
        chunk_size: 32,
        world_radius: 1,
        ..Default::default()
    };
    let seeds = WorldSeeds::from_master(SEED);

    // Generate the base terrain once; every variant erodes its own copy
    let (base, _influence) = biomes::blend_biomes(
        config.chunk_size,
        config.world_size(),
        &config.plains,
        &config.hills,
        &config.mountains,
        &PerlinNoiseSource,
        &seeds,
    );

    let variants: Vec<(&str, SimulationParams)> = vec![
        (
            "1. No erosion",
            SimulationParams {
                droplets_per_unit_area: 0.0,
                ..Default::default()
            },
        ),
        ("2. Default", SimulationParams::default()),
        ("3. Fast", SimulationParams::fast()),
        ("4. Dramatic", SimulationParams::dramatic()),
        (
            "5. Wide brush",
            SimulationParams {
                brush_radius: 6,
                ..Default::default()
            },
        ),
        (
            "6. High inertia",
            SimulationParams {
                inertia: 0.8,
                ..Default::default()
            },
        ),
    ];

    let side = base.width as u32;
    let rows = (variants.len() + COLUMNS - 1) / COLUMNS;
    let mut sheet: RgbImage = ImageBuffer::new(side * COLUMNS as u32, side * rows as u32);

    for (i, (name, params)) in variants.iter().enumerate() {
        let mut heightmap = base.clone();
        let stats = erosion::simulate(&mut heightmap, params, seeds.erosion);
        println!(
            "{}: {} droplets, eroded {:.1}, deposited {:.1}",
            name, stats.droplets, stats.total_eroded, stats.total_deposited
        );

        let shaded = export::render_shaded(&heightmap);
        let col = (i % COLUMNS) as i64;
        let row = (i / COLUMNS) as i64;
        image::imageops::replace(&mut sheet, &shaded, col * side as i64, row * side as i64);
    }

    let path = "erosion_comparison.png";
    match sheet.save(path) {
        Ok(()) => println!("Saved comparison grid: {}", path),
        Err(e) => eprintln!("Failed to save {}: {}", path, e),
    }
}
