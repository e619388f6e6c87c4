//! Pool error taxonomy.

use thiserror::Error;

/// Failures reported by the pool and its typed facade.
///
/// `ResourceExhausted` is fail-fast: the pool has already tried every
/// recovery it supports (scavenging larger free-list buckets) before
/// returning it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("out of memory: system source refused {requested} bytes and no free block could be scavenged")]
    ResourceExhausted { requested: usize },
    #[error("invalid pool config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("allocation size overflow: {count} elements of {elem_size} bytes")]
    LayoutOverflow { count: usize, elem_size: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        let err = PoolError::ResourceExhausted { requested: 2560 };
        assert!(err.to_string().contains("2560 bytes"));

        let err = PoolError::InvalidConfig {
            field: "align",
            reason: "must be a power of two".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid pool config `align`: must be a power of two"
        );

        let err = PoolError::LayoutOverflow {
            count: usize::MAX,
            elem_size: 8,
        };
        assert!(err.to_string().starts_with("allocation size overflow"));
    }
}
