//! Seed aggregation.
//!
//! A sweep repeats each (threads, beam width) cell with several RNG seeds to
//! average out run-to-run variance. This module collapses those repeats into
//! one value per cell with an arithmetic mean. No outlier or variance
//! handling; mean only.

use crate::key::{ConfigKey, SeededConfigKey};
use std::collections::BTreeMap;

/// Average observations across seeds for each grid cell.
///
/// Pure and order-independent: the result does not depend on input iteration
/// order beyond floating-point summation order. Groups cannot be empty since
/// they are derived from existing keys.
pub fn average_seeds(observations: &BTreeMap<SeededConfigKey, f64>) -> BTreeMap<ConfigKey, f64> {
    let mut sums: BTreeMap<ConfigKey, (f64, usize)> = BTreeMap::new();

    for (key, value) in observations {
        let entry = sums.entry(key.config()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observations(entries: &[(u32, u32, u64, f64)]) -> BTreeMap<SeededConfigKey, f64> {
        entries
            .iter()
            .map(|&(t, b, s, v)| (SeededConfigKey::new(t, b, s), v))
            .collect()
    }

    #[test]
    fn test_mean_across_seeds() {
        let obs = observations(&[(4, 8, 1, 100.0), (4, 8, 2, 120.0), (4, 8, 3, 110.0)]);
        let averaged = average_seeds(&obs);
        assert_eq!(averaged.len(), 1);
        assert_eq!(averaged[&ConfigKey::new(4, 8)], 110.0);
    }

    #[test]
    fn test_cells_average_independently() {
        let obs = observations(&[
            (4, 8, 1, 100.0),
            (4, 8, 2, 120.0),
            (8, 16, 1, 50.0),
            (8, 16, 2, 70.0),
        ]);
        let averaged = average_seeds(&obs);
        assert_eq!(averaged[&ConfigKey::new(4, 8)], 110.0);
        assert_eq!(averaged[&ConfigKey::new(8, 16)], 60.0);
    }

    #[test]
    fn test_single_seed_is_identity() {
        let obs = observations(&[(2, 4, 7, 42.5)]);
        let averaged = average_seeds(&obs);
        assert_eq!(averaged[&ConfigKey::new(2, 4)], 42.5);
    }

    #[test]
    fn test_order_independence() {
        let forward = observations(&[(1, 2, 1, 1.0), (1, 2, 2, 2.0), (1, 2, 3, 3.0)]);
        let reversed = observations(&[(1, 2, 3, 3.0), (1, 2, 2, 2.0), (1, 2, 1, 1.0)]);
        assert_eq!(average_seeds(&forward), average_seeds(&reversed));
    }
}
