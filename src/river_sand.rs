//! River and sand influence derivation
//!
//! Compares the height field before and after erosion. Channels carved by
//! droplets show up as strong negative deltas and become river influence;
//! sediment fans show up as positive deltas and become sand influence. Both
//! maps are normalized against the largest delta of their sign, with an
//! epsilon floor so a field the droplets never touched divides cleanly.

use crate::tilemap::Tilemap;

const RANGE_EPSILON: f32 = 1e-3;

/// Derive the river and sand influence maps from the erosion delta.
/// Both outputs are in [0, 1] and share the height field's dimensions.
pub fn derive_river_sand(
    before: &Tilemap<f32>,
    after: &Tilemap<f32>,
) -> (Tilemap<f32>, Tilemap<f32>) {
    assert_eq!(before.width, after.width);
    assert_eq!(before.height, after.height);
    let side = before.width;

    // Negative where material was removed, positive where deposited
    let delta = Tilemap::from_fn(side, |x, y| *after.get(x, y) - *before.get(x, y));

    let (min_delta, max_delta) = delta.min_max();
    let max_erode = min_delta.abs().max(RANGE_EPSILON);
    let max_deposit = max_delta.abs().max(RANGE_EPSILON);

    let rivers = Tilemap::from_fn(side, |x, y| {
        let d = *delta.get(x, y);
        1.0 - ((d / max_erode).clamp(-1.0, 0.0) + 1.0)
    });
    let sand = Tilemap::from_fn(side, |x, y| {
        let d = *delta.get(x, y);
        (d / max_deposit).clamp(0.0, 1.0)
    });

    (rivers, sand)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_field_yields_zero_maps() {
        let field = Tilemap::new_with(8, 8, 3.0f32);
        let (rivers, sand) = derive_river_sand(&field, &field.clone());

        for (_, _, &r) in rivers.iter() {
            assert_eq!(r, 0.0);
        }
        for (_, _, &s) in sand.iter() {
            assert_eq!(s, 0.0);
        }
    }

    #[test]
    fn test_strongest_erosion_maps_to_one() {
        let before = Tilemap::new_with(4, 4, 10.0f32);
        let mut after = before.clone();
        after.set(1, 1, 6.0); // carved by 4
        after.set(2, 2, 8.0); // carved by 2
        after.set(3, 3, 11.0); // deposited 1

        let (rivers, sand) = derive_river_sand(&before, &after);

        assert!((*rivers.get(1, 1) - 1.0).abs() < 1e-5);
        assert!((*rivers.get(2, 2) - 0.5).abs() < 1e-5);
        assert_eq!(*rivers.get(3, 3), 0.0);
        assert!((*sand.get(3, 3) - 1.0).abs() < 1e-5);
        assert_eq!(*sand.get(1, 1), 0.0);
    }

    #[test]
    fn test_outputs_stay_in_unit_range() {
        let before = Tilemap::from_fn(16, |x, y| (x * y) as f32 * 0.1);
        let after = Tilemap::from_fn(16, |x, y| (x as f32 - y as f32) * 0.3);

        let (rivers, sand) = derive_river_sand(&before, &after);

        for (_, _, &v) in rivers.iter() {
            assert!((0.0..=1.0).contains(&v));
        }
        for (_, _, &v) in sand.iter() {
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
