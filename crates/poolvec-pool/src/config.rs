//! Pool configuration.
//!
//! Defaults reproduce the classic layout: 8-byte alignment, 16 buckets up to
//! 128 bytes, 20 objects per refill. A few knobs can be overridden from the
//! environment:
//! - `POOLVEC_REFILL_OBJECTS`: objects carved per refill (>= 1).
//! - `POOLVEC_HEAP_LIMIT`: cap on bytes outstanding from the system
//!   allocator (decimal or `0x` hex).
//! - `POOLVEC_LOG`: lifecycle log threshold (`trace`..`error`, `off`).
//!
//! Unparsable values fall back to the default rather than failing.

use std::mem;

use crate::error::PoolError;
use crate::log::PoolLogLevel;

/// Alignment unit; every block size is a multiple of this.
pub const DEFAULT_ALIGN: usize = 8;

/// Requests above this many bytes bypass the free lists.
pub const DEFAULT_MAX_BLOCK: usize = 128;

/// Objects carved from the arena per refill.
pub const DEFAULT_REFILL_OBJECTS: usize = 20;

/// Lifecycle ring size.
pub const DEFAULT_LOG_CAPACITY: usize = 4096;

pub const ENV_REFILL_OBJECTS: &str = "POOLVEC_REFILL_OBJECTS";
pub const ENV_HEAP_LIMIT: &str = "POOLVEC_HEAP_LIMIT";
pub const ENV_LOG: &str = "POOLVEC_LOG";

/// Tunables for a [`crate::FixedSizePool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub align: usize,
    pub max_block: usize,
    pub refill_objects: usize,
    /// Bytes the pool may hold from the system at once. A request that
    /// would cross the limit is treated as a system allocation failure.
    pub heap_limit: Option<usize>,
    pub log_level: PoolLogLevel,
    pub log_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            align: DEFAULT_ALIGN,
            max_block: DEFAULT_MAX_BLOCK,
            refill_objects: DEFAULT_REFILL_OBJECTS,
            heap_limit: None,
            log_level: PoolLogLevel::Off,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl PoolConfig {
    /// Reads overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. `from_env` is this
    /// with `std::env::var`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(objects) = lookup(ENV_REFILL_OBJECTS).and_then(|raw| parse_usize(&raw)) {
            if objects >= 1 {
                config.refill_objects = objects;
            }
        }
        if let Some(limit) = lookup(ENV_HEAP_LIMIT).and_then(|raw| parse_usize(&raw)) {
            config.heap_limit = Some(limit);
        }
        if let Some(level) = lookup(ENV_LOG) {
            config.log_level = PoolLogLevel::from_str_loose(&level);
        }
        config
    }

    #[must_use]
    pub fn with_heap_limit(mut self, limit: usize) -> Self {
        self.heap_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_refill_objects(mut self, objects: usize) -> Self {
        self.refill_objects = objects;
        self
    }

    #[must_use]
    pub fn with_log_level(mut self, level: PoolLogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Number of free-list buckets this config produces.
    #[must_use]
    pub fn size_classes(&self) -> usize {
        self.max_block / self.align
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if !self.align.is_power_of_two() {
            return Err(invalid("align", format!("{} is not a power of two", self.align)));
        }
        // A free block stores its forward link in its first word.
        if self.align < mem::size_of::<usize>() {
            return Err(invalid(
                "align",
                format!(
                    "{} is smaller than a pointer ({} bytes)",
                    self.align,
                    mem::size_of::<usize>()
                ),
            ));
        }
        if self.max_block < self.align || self.max_block % self.align != 0 {
            return Err(invalid(
                "max_block",
                format!("{} is not a positive multiple of align {}", self.max_block, self.align),
            ));
        }
        if self.refill_objects == 0 {
            return Err(invalid("refill_objects", "must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> PoolError {
    PoolError::InvalidConfig { field, reason }
}

fn parse_usize(raw: &str) -> Option<usize> {
    let raw = raw.trim().replace('_', "");
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_is_valid_and_has_sixteen_classes() {
        let config = PoolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.size_classes(), 16);
        assert_eq!(config.log_level, PoolLogLevel::Off);
    }

    #[test]
    fn lookup_overrides() {
        let config = PoolConfig::from_lookup(lookup_from(&[
            (ENV_REFILL_OBJECTS, "4"),
            (ENV_HEAP_LIMIT, "0x1_000"),
            (ENV_LOG, "debug"),
        ]));
        assert_eq!(config.refill_objects, 4);
        assert_eq!(config.heap_limit, Some(4096));
        assert_eq!(config.log_level, PoolLogLevel::Debug);
    }

    #[test]
    fn unparsable_values_fall_back() {
        let config = PoolConfig::from_lookup(lookup_from(&[
            (ENV_REFILL_OBJECTS, "0"),
            (ENV_HEAP_LIMIT, "lots"),
            (ENV_LOG, "loud"),
        ]));
        assert_eq!(config, PoolConfig::default());
    }

    #[test]
    fn rejects_bad_alignment() {
        let config = PoolConfig {
            align: 12,
            ..PoolConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PoolError::InvalidConfig { field: "align", .. })
        ));

        let config = PoolConfig {
            align: 2,
            max_block: 16,
            ..PoolConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PoolError::InvalidConfig { field: "align", .. })
        ));
    }

    #[test]
    fn rejects_bad_max_block_and_refill() {
        let config = PoolConfig {
            max_block: 100,
            ..PoolConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PoolError::InvalidConfig { field: "max_block", .. })
        ));

        let config = PoolConfig::default().with_refill_objects(0);
        assert!(matches!(
            config.validate(),
            Err(PoolError::InvalidConfig {
                field: "refill_objects",
                ..
            })
        ));
    }
}
