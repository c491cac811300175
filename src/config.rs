//! Construction-time configuration for the maps.

use crate::error::{MapError, Result};

/// Bucket count used by `new()`.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Fraction of `capacity` that `len` may reach before the table doubles.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Largest bucket count the table grows to.
pub const MAX_CAPACITY: usize = 1 << 30;

/// Initial bucket count and load factor of a map.
///
/// ```
/// use multikey_hashmap::{BinaryKeyMap, MapConfig};
///
/// let config = MapConfig::new().with_initial_capacity(100).with_load_factor(0.5);
/// let map: BinaryKeyMap<u32, u32, &str> = BinaryKeyMap::with_config(config).unwrap();
/// assert_eq!(map.capacity(), 128);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapConfig {
    initial_capacity: usize,
    load_factor: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested bucket count; rounded up to a power of two on construction.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.initial_capacity > MAX_CAPACITY {
            return Err(MapError::InvalidArgument(format!(
                "initial capacity {} exceeds maximum {}",
                self.initial_capacity, MAX_CAPACITY
            )));
        }
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 {
            return Err(MapError::InvalidArgument(format!(
                "load factor must be a positive finite number, got {}",
                self.load_factor
            )));
        }
        // A table at MAX_CAPACITY must hold at least one entry.
        if (MAX_CAPACITY as f64 * self.load_factor) < 1.0 {
            return Err(MapError::InvalidArgument(format!(
                "load factor {} is too small for a table of at most {} buckets",
                self.load_factor, MAX_CAPACITY
            )));
        }
        Ok(())
    }

    /// Power-of-two bucket count for the initial table.
    pub(crate) fn bucket_count(&self) -> usize {
        self.initial_capacity.max(1).next_power_of_two()
    }
}

/// Entry count above which a table of `capacity` buckets must grow.
pub(crate) fn threshold_for(capacity: usize, load_factor: f64) -> usize {
    if capacity >= MAX_CAPACITY {
        usize::MAX
    } else {
        (capacity as f64 * load_factor) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = MapConfig::default();
        assert_eq!(c.initial_capacity(), DEFAULT_INITIAL_CAPACITY);
        assert_eq!(c.load_factor(), DEFAULT_LOAD_FACTOR);
        assert!(c.validate().is_ok());
        assert_eq!(c.bucket_count(), 16);
    }

    #[test]
    fn bucket_count_rounds_up_to_power_of_two() {
        assert_eq!(MapConfig::new().with_initial_capacity(0).bucket_count(), 1);
        assert_eq!(MapConfig::new().with_initial_capacity(1).bucket_count(), 1);
        assert_eq!(MapConfig::new().with_initial_capacity(17).bucket_count(), 32);
        assert_eq!(MapConfig::new().with_initial_capacity(64).bucket_count(), 64);
    }

    #[test]
    fn rejects_malformed_arguments() {
        for lf in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            match MapConfig::new().with_load_factor(lf).validate() {
                Err(MapError::InvalidArgument(_)) => {}
                other => panic!("load factor {lf}: unexpected {other:?}"),
            }
        }
        match MapConfig::new()
            .with_initial_capacity(MAX_CAPACITY + 1)
            .validate()
        {
            Err(MapError::InvalidArgument(_)) => {}
            other => panic!("unexpected {other:?}"),
        }
        assert!(MapConfig::new()
            .with_initial_capacity(MAX_CAPACITY)
            .validate()
            .is_ok());
    }

    /// Invariant: load factors below 1 / MAX_CAPACITY are rejected; the
    /// smallest usable one is accepted.
    #[test]
    fn rejects_load_factor_no_table_could_satisfy() {
        for lf in [1e-10, 0.5 / MAX_CAPACITY as f64, f64::MIN_POSITIVE] {
            match MapConfig::new().with_load_factor(lf).validate() {
                Err(MapError::InvalidArgument(_)) => {}
                other => panic!("load factor {lf}: unexpected {other:?}"),
            }
        }
        let smallest = 1.0 / MAX_CAPACITY as f64;
        assert!(MapConfig::new().with_load_factor(smallest).validate().is_ok());
        assert!(MapConfig::new().with_load_factor(1e-7).validate().is_ok());
    }

    #[test]
    fn threshold_scales_with_load_factor() {
        assert_eq!(threshold_for(16, 0.75), 12);
        assert_eq!(threshold_for(16, 2.0), 32);
        assert_eq!(threshold_for(MAX_CAPACITY, 0.75), usize::MAX);
    }
}
