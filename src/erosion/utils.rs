//! Sampling and brush utilities for the droplet simulation
//!
//! Height and gradient are sampled at floating-point positions via bilinear
//! interpolation over the four surrounding cells. The erosion brush spreads
//! material removal over a radial neighborhood so channels do not collapse
//! into single-cell trenches.

use crate::tilemap::Tilemap;

/// Sample height at a floating-point position using bilinear interpolation.
pub fn height_at(heightmap: &Tilemap<f32>, x: f32, y: f32) -> f32 {
    heightmap.sample_bilinear(x, y)
}

/// Gradient at a floating-point position, interpolated from the four cell
/// corners. Points in the direction of steepest ascent.
pub fn gradient_at(heightmap: &Tilemap<f32>, x: f32, y: f32) -> (f32, f32) {
    let x = x.clamp(0.0, heightmap.width as f32 - 1.0);
    let y = y.clamp(0.0, heightmap.height as f32 - 1.0);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(heightmap.width - 1);
    let y1 = (y0 + 1).min(heightmap.height - 1);

    let fx = x.fract();
    let fy = y.fract();

    let h00 = *heightmap.get(x0, y0);
    let h10 = *heightmap.get(x1, y0);
    let h01 = *heightmap.get(x0, y1);
    let h11 = *heightmap.get(x1, y1);

    // dh/dx at the two rows, interpolated in y
    let gx0 = h10 - h00;
    let gx1 = h11 - h01;
    let grad_x = gx0 * (1.0 - fy) + gx1 * fy;

    // dh/dy at the two columns, interpolated in x
    let gy0 = h01 - h00;
    let gy1 = h11 - h10;
    let grad_y = gy0 * (1.0 - fx) + gy1 * fx;

    (grad_x, grad_y)
}

/// Create a radial erosion brush: weight falls off linearly with distance
/// from the center, normalized so the weights sum to 1.
pub fn create_erosion_brush(radius: usize) -> Vec<(i32, i32, f32)> {
    let mut brush = Vec::new();
    let r = radius.max(1) as i32;
    let r_f = r as f32;
    let mut total_weight = 0.0;

    for dy in -r..=r {
        for dx in -r..=r {
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            let weight = (1.0 - dist / r_f).max(0.0);
            if weight > 0.0 {
                brush.push((dx, dy, weight));
                total_weight += weight;
            }
        }
    }

    for (_, _, w) in brush.iter_mut() {
        *w /= total_weight;
    }

    brush
}

/// Subtract `amount` from the grid through the brush centered at (x, y).
/// The caller has already verified the footprint is inside the grid.
pub fn apply_erosion_brush(
    heightmap: &mut Tilemap<f32>,
    brush: &[(i32, i32, f32)],
    x: usize,
    y: usize,
    amount: f32,
) {
    for &(dx, dy, weight) in brush {
        let nx = (x as i32 + dx) as usize;
        let ny = (y as i32 + dy) as usize;
        *heightmap.get_mut(nx, ny) -= amount * weight;
    }
}

/// Deposit `amount` onto the four cells surrounding a floating-point
/// position, weighted by the bilinear fractional coordinates. The weights
/// sum to 1, so the grid gains exactly `amount`.
pub fn deposit_bilinear(heightmap: &mut Tilemap<f32>, x: f32, y: f32, amount: f32) {
    let x = x.clamp(0.0, heightmap.width as f32 - 1.0);
    let y = y.clamp(0.0, heightmap.height as f32 - 1.0);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(heightmap.width - 1);
    let y1 = (y0 + 1).min(heightmap.height - 1);

    let fx = x.fract();
    let fy = y.fract();

    *heightmap.get_mut(x0, y0) += amount * (1.0 - fx) * (1.0 - fy);
    *heightmap.get_mut(x1, y0) += amount * fx * (1.0 - fy);
    *heightmap.get_mut(x0, y1) += amount * (1.0 - fx) * fy;
    *heightmap.get_mut(x1, y1) += amount * fx * fy;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_flat_is_zero() {
        let map = Tilemap::new_with(4, 4, 5.0f32);
        let (gx, gy) = gradient_at(&map, 1.5, 1.5);
        assert!(gx.abs() < 1e-5);
        assert!(gy.abs() < 1e-5);
    }

    #[test]
    fn test_gradient_on_ramp() {
        // z = x: gradient points along +x with unit slope
        let map = Tilemap::from_fn(8, |x, _| x as f32);
        let (gx, gy) = gradient_at(&map, 3.5, 3.5);
        assert!((gx - 1.0).abs() < 1e-5);
        assert!(gy.abs() < 1e-5);
    }

    #[test]
    fn test_erosion_brush_normalized() {
        for radius in 1..=5 {
            let brush = create_erosion_brush(radius);
            let total: f32 = brush.iter().map(|(_, _, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-4, "radius {} sums to {}", radius, total);
        }
    }

    #[test]
    fn test_brush_offsets_within_radius() {
        let brush = create_erosion_brush(3);
        for &(dx, dy, w) in &brush {
            assert!(dx.abs() <= 3 && dy.abs() <= 3);
            assert!(w > 0.0);
        }
    }

    #[test]
    fn test_deposit_bilinear_conserves_mass() {
        let mut map = Tilemap::new_with(8, 8, 0.0f32);
        let before = map.total();
        deposit_bilinear(&mut map, 3.25, 4.75, 2.0);
        assert!((map.total() - before - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_erosion_brush_removes_exact_amount() {
        let mut map = Tilemap::new_with(16, 16, 10.0f32);
        let brush = create_erosion_brush(3);
        let before = map.total();
        apply_erosion_brush(&mut map, &brush, 8, 8, 1.5);
        assert!((before - map.total() - 1.5).abs() < 1e-4);
    }
}
