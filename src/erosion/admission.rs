//! Spatial admission control for concurrent droplet simulations
//!
//! Before a droplet starts, its starting position must be farther than the
//! exclusion radius (`max_steps + brush_radius`, the droplet's maximum
//! possible footprint) from the start of every droplet currently running.
//! The check-and-insert is atomic under one mutex; release is tied to guard
//! drop, so a droplet that aborts early can never leave a stuck zone behind.
//!
//! The radius is a heuristic over start positions, not a proof that brush
//! writes cannot overlap; actual grid writes are serialized separately by
//! the simulator's write lock.

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

/// Set of starting positions of droplets currently executing.
pub struct ActiveZoneSet {
    positions: Mutex<Vec<(f32, f32)>>,
    exclusion_radius: f32,
}

impl ActiveZoneSet {
    pub fn new(exclusion_radius: f32) -> Self {
        Self {
            positions: Mutex::new(Vec::new()),
            exclusion_radius,
        }
    }

    /// Atomically check the exclusion rule and claim the position.
    /// Returns `None` if another active droplet is too close.
    pub fn try_acquire(&self, x: f32, y: f32) -> Option<ZoneGuard<'_>> {
        let radius_sq = self.exclusion_radius * self.exclusion_radius;
        let mut positions = self.positions.lock().unwrap();

        let blocked = positions.iter().any(|&(px, py)| {
            let dx = px - x;
            let dy = py - y;
            dx * dx + dy * dy <= radius_sq
        });
        if blocked {
            return None;
        }

        positions.push((x, y));
        Some(ZoneGuard { zones: self, x, y })
    }

    /// Claim the position, spin-waiting with a short backoff until a slot
    /// opens. Droplets have bounded runtime, so the active set drains and
    /// this cannot starve.
    pub fn acquire(&self, x: f32, y: f32) -> ZoneGuard<'_> {
        loop {
            if let Some(guard) = self.try_acquire(x, y) {
                return guard;
            }
            thread::sleep(Duration::from_micros(100));
        }
    }

    fn release(&self, x: f32, y: f32) {
        let mut positions = self.positions.lock().unwrap();
        if let Some(idx) = positions.iter().position(|&(px, py)| px == x && py == y) {
            positions.swap_remove(idx);
        }
    }

    pub fn active_count(&self) -> usize {
        self.positions.lock().unwrap().len()
    }
}

/// Claim on a starting position; releases it exactly once on drop,
/// regardless of how the droplet's simulation ended.
pub struct ZoneGuard<'a> {
    zones: &'a ActiveZoneSet,
    x: f32,
    y: f32,
}

impl Drop for ZoneGuard<'_> {
    fn drop(&mut self) {
        self.zones.release(self.x, self.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_position_within_radius() {
        let zones = ActiveZoneSet::new(10.0);
        let _guard = zones.try_acquire(50.0, 50.0).unwrap();

        assert!(zones.try_acquire(55.0, 50.0).is_none());
        assert!(zones.try_acquire(50.0, 59.9).is_none());
    }

    #[test]
    fn test_admits_position_beyond_radius() {
        let zones = ActiveZoneSet::new(10.0);
        let _a = zones.try_acquire(0.0, 0.0).unwrap();
        let _b = zones.try_acquire(20.0, 0.0).unwrap();

        assert_eq!(zones.active_count(), 2);
    }

    #[test]
    fn test_guard_drop_releases_zone() {
        let zones = ActiveZoneSet::new(10.0);
        {
            let _guard = zones.try_acquire(5.0, 5.0).unwrap();
            assert!(zones.try_acquire(5.0, 5.0).is_none());
        }
        assert_eq!(zones.active_count(), 0);
        assert!(zones.try_acquire(5.0, 5.0).is_some());
    }

    #[test]
    fn test_release_is_tied_to_completion_not_success() {
        // A panicking simulation still releases its zone on unwind.
        let zones = ActiveZoneSet::new(4.0);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = zones.try_acquire(1.0, 1.0).unwrap();
            panic!("droplet fault");
        }));
        assert!(result.is_err());
        assert_eq!(zones.active_count(), 0);
    }

    #[test]
    fn test_exclusion_rule_never_admits_close_pair() {
        // Replay a fixed request sequence; at no point may two active
        // positions be within the radius of each other.
        let zones = ActiveZoneSet::new(8.0);
        let requests = [
            (0.0f32, 0.0f32),
            (4.0, 4.0),
            (20.0, 0.0),
            (20.0, 7.0),
            (40.0, 40.0),
        ];

        let mut guards = Vec::new();
        for &(x, y) in &requests {
            if let Some(g) = zones.try_acquire(x, y) {
                guards.push((x, y, g));
            }
        }

        for i in 0..guards.len() {
            for j in (i + 1)..guards.len() {
                let dx = guards[i].0 - guards[j].0;
                let dy = guards[i].1 - guards[j].1;
                assert!((dx * dx + dy * dy).sqrt() > 8.0);
            }
        }
    }
}
