//! PNG export of generated maps
//!
//! Debug/preview output: grayscale height and influence maps, the blended
//! biome color map, and a hillshaded relief render.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::biomes::InfluenceMaps;
use crate::chunks::vertex_color;
use crate::tilemap::Tilemap;

/// Export a height field as a normalized grayscale PNG.
pub fn export_heightmap(heightmap: &Tilemap<f32>, path: &str) -> Result<(), image::ImageError> {
    let (min_h, max_h) = heightmap.min_max();
    let range = (max_h - min_h).max(1e-6);

    let mut img: RgbImage = ImageBuffer::new(heightmap.width as u32, heightmap.height as u32);
    for y in 0..heightmap.height {
        for x in 0..heightmap.width {
            let t = (*heightmap.get(x, y) - min_h) / range;
            let v = (t * 255.0) as u8;
            img.put_pixel(x as u32, y as u32, Rgb([v, v, v]));
        }
    }
    img.save(path)
}

/// Export an influence map as grayscale; values are clamped to [0, 1].
pub fn export_influence_map(map: &Tilemap<f32>, path: &str) -> Result<(), image::ImageError> {
    let mut img: RgbImage = ImageBuffer::new(map.width as u32, map.height as u32);
    for y in 0..map.height {
        for x in 0..map.width {
            let v = (map.get(x, y).clamp(0.0, 1.0) * 255.0) as u8;
            img.put_pixel(x as u32, y as u32, Rgb([v, v, v]));
        }
    }
    img.save(path)
}

/// Export the blended biome color map (the same per-vertex colors the tiles
/// carry, rendered top-down).
pub fn export_color_map(influence: &InfluenceMaps, path: &str) -> Result<(), image::ImageError> {
    let side = influence.side();
    let mut img: RgbImage = ImageBuffer::new(side as u32, side as u32);
    for y in 0..side {
        for x in 0..side {
            let c = vertex_color(influence, x, y);
            img.put_pixel(
                x as u32,
                y as u32,
                Rgb([
                    (c[0].clamp(0.0, 1.0) * 255.0) as u8,
                    (c[1].clamp(0.0, 1.0) * 255.0) as u8,
                    (c[2].clamp(0.0, 1.0) * 255.0) as u8,
                ]),
            );
        }
    }
    img.save(path)
}

/// Render a hillshaded relief image (light from the northwest).
pub fn render_shaded(heightmap: &Tilemap<f32>) -> RgbImage {
    let width = heightmap.width;
    let height = heightmap.height;
    let mut img: RgbImage = ImageBuffer::new(width as u32, height as u32);

    let (min_h, max_h) = heightmap.min_max();
    let range = (max_h - min_h).max(1e-6);

    for y in 0..height {
        for x in 0..width {
            let xr = (x + 1).min(width - 1);
            let yd = (y + 1).min(height - 1);
            let gx = *heightmap.get(xr, y) - *heightmap.get(x, y);
            let gy = *heightmap.get(x, yd) - *heightmap.get(x, y);

            // Lambert-ish shading against a fixed NW light
            let shade = (0.7 - gx * 0.15 - gy * 0.15).clamp(0.15, 1.0);
            let t = (*heightmap.get(x, y) - min_h) / range;
            let base = 80.0 + t * 160.0;
            let v = (base * shade) as u8;
            img.put_pixel(x as u32, y as u32, Rgb([v, v, v]));
        }
    }
    img
}

/// Export the hillshaded relief as PNG.
pub fn export_shaded(heightmap: &Tilemap<f32>, path: &str) -> Result<(), image::ImageError> {
    render_shaded(heightmap).save(path)
}
