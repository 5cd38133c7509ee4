//! Concurrent droplet simulation
//!
//! Each droplet follows the terrain gradient, picking up sediment on
//! downhill runs and depositing it when it slows or climbs. All droplets
//! mutate one shared height grid: sampling goes through a read lock so
//! droplets interleave freely, while deposit and brush writes take the
//! write lock. Admission control (see `admission`) keeps concurrently
//! running droplets spatially separated so the interleaved reads stay
//! numerically plausible.
//!
//! Droplet tasks run on the rayon pool, one droplet per task, each with its
//! own seeded RNG stream so results are reproducible for a fixed seed and
//! droplet count (the order of grid writes is still scheduler-dependent).

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::erosion::admission::ActiveZoneSet;
use crate::erosion::params::SimulationParams;
use crate::erosion::utils::{
    apply_erosion_brush, create_erosion_brush, deposit_bilinear, gradient_at, height_at,
};
use crate::erosion::ErosionStats;
use crate::tilemap::Tilemap;

/// Threshold below which direction, velocity, and height deltas count as zero.
const MOTION_EPSILON: f32 = 1e-3;

/// How a droplet's step loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    /// Ran all of its allowed steps
    MaxSteps,
    /// Velocity and height delta both fell below the motion threshold
    Stalled,
    /// Direction vector collapsed to zero (flat ground or local minimum)
    Degenerate,
    /// Next step would leave the grid
    OutOfBounds,
    /// Erosion brush footprint would cross the border
    BrushClipped,
}

/// Result of one droplet simulation.
struct DropletOutcome {
    termination: Termination,
    eroded: f64,
    deposited: f64,
    position: (f32, f32),
}

/// Run the full erosion pass: `side² * droplets_per_unit_area` droplets
/// against `heightmap`, mutated in place. The caller keeps a copy of the
/// pre-erosion field if it needs the delta afterwards.
pub fn simulate(
    heightmap: &mut Tilemap<f32>,
    params: &SimulationParams,
    seed: u64,
) -> ErosionStats {
    assert_eq!(heightmap.width, heightmap.height, "height field must be square");
    let side = heightmap.width;
    let droplets = params.droplet_count(side);

    let mut stats = ErosionStats {
        droplets,
        ..Default::default()
    };
    if droplets == 0 || side < 3 {
        return stats;
    }

    let brush = create_erosion_brush(params.brush_radius);
    let zones = ActiveZoneSet::new(params.exclusion_radius());
    let grid = RwLock::new(std::mem::replace(heightmap, Tilemap::new_with(0, 0, 0.0)));

    // Fixed-point accumulators so worker threads can fold their totals
    // without another lock.
    let eroded_milli = AtomicU64::new(0);
    let deposited_milli = AtomicU64::new(0);
    let completed = AtomicU64::new(0);
    let stalled = AtomicU64::new(0);
    let degenerate = AtomicU64::new(0);
    let exited_bounds = AtomicU64::new(0);
    let brush_clipped = AtomicU64::new(0);

    (0..droplets).into_par_iter().for_each(|i| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
        let start_x = rng.gen_range(1..side - 1) as f32;
        let start_y = rng.gen_range(1..side - 1) as f32;

        // Zone is held for the droplet's whole run and released when the
        // guard drops, whatever the outcome.
        let _zone = zones.acquire(start_x, start_y);

        let outcome = simulate_droplet(&grid, &brush, params, start_x, start_y);

        eroded_milli.fetch_add((outcome.eroded * 1000.0) as u64, Ordering::Relaxed);
        deposited_milli.fetch_add((outcome.deposited * 1000.0) as u64, Ordering::Relaxed);
        let counter = match outcome.termination {
            Termination::MaxSteps => &completed,
            Termination::Stalled => &stalled,
            Termination::Degenerate => &degenerate,
            Termination::OutOfBounds => &exited_bounds,
            Termination::BrushClipped => &brush_clipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    });

    *heightmap = grid.into_inner().unwrap();

    stats.total_eroded = eroded_milli.load(Ordering::Relaxed) as f64 / 1000.0;
    stats.total_deposited = deposited_milli.load(Ordering::Relaxed) as f64 / 1000.0;
    stats.completed = completed.load(Ordering::Relaxed);
    stats.stalled = stalled.load(Ordering::Relaxed);
    stats.degenerate = degenerate.load(Ordering::Relaxed);
    stats.exited_bounds = exited_bounds.load(Ordering::Relaxed);
    stats.brush_clipped = brush_clipped.load(Ordering::Relaxed);
    stats
}

/// Simulate one droplet from `(start_x, start_y)` until it terminates.
///
/// Per step: sample height and gradient at the current position, steer the
/// direction by inertia, advance one unit, then either deposit onto the
/// four corners of the previous position or erode through the brush there,
/// update velocity from the height delta, and evaporate a little water.
fn simulate_droplet(
    grid: &RwLock<Tilemap<f32>>,
    brush: &[(i32, i32, f32)],
    params: &SimulationParams,
    start_x: f32,
    start_y: f32,
) -> DropletOutcome {
    let side = grid.read().unwrap().width;
    let max_coord = (side - 1) as f32;
    let radius = params.brush_radius as i32;

    let mut x = start_x;
    let mut y = start_y;
    let mut dir_x = 0.0f32;
    let mut dir_y = 0.0f32;
    let mut velocity = 0.0f32;
    let mut water = 1.0f32;
    let mut sediment = 0.0f32;

    let mut eroded = 0.0f64;
    let mut deposited = 0.0f64;

    let finish = |termination, eroded, deposited, x, y| DropletOutcome {
        termination,
        eroded,
        deposited,
        position: (x, y),
    };

    for _ in 0..params.max_steps {
        let (z, grad_x, grad_y) = {
            let g = grid.read().unwrap();
            let (gx, gy) = gradient_at(&g, x, y);
            (height_at(&g, x, y), gx, gy)
        };

        // Steer: blend previous direction with the downhill direction
        dir_x = dir_x * params.inertia - grad_x * (1.0 - params.inertia);
        dir_y = dir_y * params.inertia - grad_y * (1.0 - params.inertia);

        let len = (dir_x * dir_x + dir_y * dir_y).sqrt();
        if len < MOTION_EPSILON {
            return finish(Termination::Degenerate, eroded, deposited, x, y);
        }
        dir_x /= len;
        dir_y /= len;

        let new_x = x + dir_x;
        let new_y = y + dir_y;
        if new_x < 0.0 || new_x > max_coord || new_y < 0.0 || new_y > max_coord {
            return finish(Termination::OutOfBounds, eroded, deposited, x, y);
        }

        let new_z = grid.read().unwrap().sample_bilinear(new_x, new_y);
        let delta_z = new_z - z;

        let capacity =
            (-delta_z * velocity * water * params.capacity_factor).max(params.min_sediment);

        if sediment > capacity || delta_z > 0.0 {
            // Deposit: moving uphill fills the pit behind the droplet by at
            // most the height difference; otherwise shed the capacity excess.
            let amount = if delta_z > 0.0 {
                sediment.min(delta_z)
            } else {
                (sediment - capacity) * params.erosion_rate
            };
            sediment -= amount;
            {
                let mut g = grid.write().unwrap();
                deposit_bilinear(&mut g, x, y, amount);
            }
            deposited += amount as f64;
        } else {
            // Erode around the previous position, never more than the drop
            let amount = ((capacity - sediment) * params.erosion_rate).min(-delta_z);
            let cell_x = x as i32;
            let cell_y = y as i32;
            if cell_x - radius < 0
                || cell_y - radius < 0
                || cell_x + radius >= side as i32
                || cell_y + radius >= side as i32
            {
                // Footprint would cross the border: stop without applying
                return finish(Termination::BrushClipped, eroded, deposited, x, y);
            }
            sediment += amount;
            {
                let mut g = grid.write().unwrap();
                apply_erosion_brush(&mut g, brush, cell_x as usize, cell_y as usize, amount);
            }
            eroded += amount as f64;
        }

        velocity = (velocity * velocity + params.gravity * delta_z).max(0.0).sqrt();
        water *= 1.0 - params.evaporate_speed;

        x = new_x;
        y = new_y;

        if velocity < MOTION_EPSILON && delta_z.abs() < MOTION_EPSILON {
            return finish(Termination::Stalled, eroded, deposited, x, y);
        }
    }

    finish(Termination::MaxSteps, eroded, deposited, x, y)
}
