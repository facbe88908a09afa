//! Configuration grid keys.
//!
//! A benchmark sweep runs every (thread count, beam width) pair several times
//! with different random seeds. [`SeededConfigKey`] identifies one raw run;
//! [`ConfigKey`] identifies one grid cell after seeds are averaged out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One cell of the configuration grid.
///
/// Ordering is lexicographic (threads, then beam width), which gives the
/// sorted iteration order the matrix builder relies on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ConfigKey {
    /// Number of parallel search threads.
    pub num_threads: u32,

    /// Beam width of the search.
    pub beam_width: u32,
}

impl ConfigKey {
    /// Create a new grid cell key.
    pub fn new(num_threads: u32, beam_width: u32) -> Self {
        Self {
            num_threads,
            beam_width,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(threads={}, beam_width={})",
            self.num_threads, self.beam_width
        )
    }
}

/// One raw benchmark run: a grid cell plus the RNG seed that produced it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SeededConfigKey {
    /// Number of parallel search threads.
    pub num_threads: u32,

    /// Beam width of the search.
    pub beam_width: u32,

    /// RNG seed of this run.
    pub seed: u64,
}

impl SeededConfigKey {
    /// Create a new run key.
    pub fn new(num_threads: u32, beam_width: u32, seed: u64) -> Self {
        Self {
            num_threads,
            beam_width,
            seed,
        }
    }

    /// Project onto the grid cell, discarding the seed.
    pub fn config(&self) -> ConfigKey {
        ConfigKey::new(self.num_threads, self.beam_width)
    }
}

impl fmt::Display for SeededConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(threads={}, beam_width={}, seed={})",
            self.num_threads, self.beam_width, self.seed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_projection_discards_seed() {
        let a = SeededConfigKey::new(4, 8, 1);
        let b = SeededConfigKey::new(4, 8, 2);
        assert_ne!(a, b);
        assert_eq!(a.config(), b.config());
    }

    #[test]
    fn test_key_ordering_is_threads_then_beam() {
        let mut keys = vec![
            ConfigKey::new(8, 16),
            ConfigKey::new(1, 64),
            ConfigKey::new(8, 4),
            ConfigKey::new(1, 16),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                ConfigKey::new(1, 16),
                ConfigKey::new(1, 64),
                ConfigKey::new(8, 4),
                ConfigKey::new(8, 16),
            ]
        );
    }

    #[test]
    fn test_display_names_fields() {
        let key = ConfigKey::new(4, 32);
        assert_eq!(key.to_string(), "(threads=4, beam_width=32)");
    }
}
