//! Structured pool lifecycle log.
//!
//! The pool records allocation decisions as [`PoolLogRecord`]s in a bounded
//! ring instead of writing to a global logger. Records below the configured
//! [`PoolLogLevel`] threshold are never built.

use std::collections::VecDeque;

use serde::Serialize;

/// Lifecycle log level. `Off` sorts above every real level so it works as a
/// threshold that admits nothing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolLogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    #[default]
    Off,
}

impl PoolLogLevel {
    /// Parse from string (case-insensitive). Unknown values map to `Off`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" | "all" | "verbose" => Self::Trace,
            "debug" => Self::Debug,
            "info" | "on" => Self::Info,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Off,
        }
    }

    /// Returns true if a record at `self` passes `threshold`.
    #[must_use]
    pub fn admits(self, threshold: Self) -> bool {
        self != Self::Off && self >= threshold
    }
}

/// One structured lifecycle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolLogRecord {
    /// Monotonic decision id, unique per pool.
    pub decision_id: u64,
    /// Correlation id (`pool::<symbol>::<decision_id>`).
    pub trace_id: String,
    pub level: PoolLogLevel,
    /// API entry point (`allocate`, `deallocate`, `refill`, `chunk_alloc`).
    pub symbol: &'static str,
    /// Event kind (`alloc`, `dealloc`, `grow`, `scavenge`, ...).
    pub event: &'static str,
    /// Address involved in the event.
    pub ptr: Option<usize>,
    /// Byte count involved in the event.
    pub size: Option<usize>,
    /// Free-list bucket involved in the event.
    pub bin: Option<usize>,
    /// Machine-readable outcome label.
    pub outcome: &'static str,
    pub details: String,
    /// Snapshot: bytes ever requested for arena growth.
    pub heap_size: usize,
    /// Snapshot: bytes left in the current arena.
    pub arena_remaining: usize,
}

/// Event payload handed to [`LifecycleLog::record`].
#[derive(Debug, Clone)]
pub(crate) struct LogEvent {
    pub level: PoolLogLevel,
    pub symbol: &'static str,
    pub event: &'static str,
    pub ptr: Option<usize>,
    pub size: Option<usize>,
    pub bin: Option<usize>,
    pub outcome: &'static str,
    pub details: String,
}

impl LogEvent {
    pub fn new(level: PoolLogLevel, symbol: &'static str, event: &'static str) -> Self {
        Self {
            level,
            symbol,
            event,
            ptr: None,
            size: None,
            bin: None,
            outcome: "success",
            details: String::new(),
        }
    }

    pub fn ptr(mut self, ptr: *const u8) -> Self {
        self.ptr = Some(ptr as usize);
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn bin(mut self, bin: usize) -> Self {
        self.bin = Some(bin);
        self
    }

    pub fn outcome(mut self, outcome: &'static str) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }
}

/// Bounded ring of lifecycle records.
#[derive(Debug)]
pub(crate) struct LifecycleLog {
    records: VecDeque<PoolLogRecord>,
    capacity: usize,
    threshold: PoolLogLevel,
    next_decision_id: u64,
}

impl LifecycleLog {
    pub fn new(threshold: PoolLogLevel, capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity,
            threshold,
            next_decision_id: 1,
        }
    }

    /// Cheap pre-check so callers can skip formatting `details`.
    pub fn enabled(&self, level: PoolLogLevel) -> bool {
        self.capacity > 0 && level.admits(self.threshold)
    }

    pub fn record(&mut self, event: LogEvent, heap_size: usize, arena_remaining: usize) {
        if !self.enabled(event.level) {
            return;
        }
        let decision_id = self.next_decision_id;
        self.next_decision_id = self.next_decision_id.wrapping_add(1);
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(PoolLogRecord {
            decision_id,
            trace_id: format!("pool::{}::{:016x}", event.symbol, decision_id),
            level: event.level,
            symbol: event.symbol,
            event: event.event,
            ptr: event.ptr,
            size: event.size,
            bin: event.bin,
            outcome: event.outcome,
            details: event.details,
            heap_size,
            arena_remaining,
        });
    }

    pub fn records(&self) -> impl Iterator<Item = &PoolLogRecord> {
        self.records.iter()
    }

    pub fn drain(&mut self) -> Vec<PoolLogRecord> {
        self.records.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_levels() {
        assert_eq!(PoolLogLevel::from_str_loose("TRACE"), PoolLogLevel::Trace);
        assert_eq!(PoolLogLevel::from_str_loose("debug"), PoolLogLevel::Debug);
        assert_eq!(PoolLogLevel::from_str_loose("on"), PoolLogLevel::Info);
        assert_eq!(PoolLogLevel::from_str_loose(" warning "), PoolLogLevel::Warn);
        assert_eq!(PoolLogLevel::from_str_loose("error"), PoolLogLevel::Error);
        assert_eq!(PoolLogLevel::from_str_loose("bogus"), PoolLogLevel::Off);
    }

    #[test]
    fn off_threshold_admits_nothing() {
        for level in [
            PoolLogLevel::Trace,
            PoolLogLevel::Debug,
            PoolLogLevel::Info,
            PoolLogLevel::Warn,
            PoolLogLevel::Error,
        ] {
            assert!(!level.admits(PoolLogLevel::Off));
        }
        assert!(PoolLogLevel::Warn.admits(PoolLogLevel::Info));
        assert!(!PoolLogLevel::Debug.admits(PoolLogLevel::Info));
    }

    #[test]
    fn ring_drops_oldest_when_full() {
        let mut log = LifecycleLog::new(PoolLogLevel::Trace, 2);
        for event in ["a", "b", "c"] {
            log.record(LogEvent::new(PoolLogLevel::Info, "allocate", event), 0, 0);
        }
        let events: Vec<_> = log.records().map(|r| r.event).collect();
        assert_eq!(events, vec!["b", "c"]);
        let ids: Vec<_> = log.records().map(|r| r.decision_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn below_threshold_is_skipped() {
        let mut log = LifecycleLog::new(PoolLogLevel::Warn, 16);
        log.record(LogEvent::new(PoolLogLevel::Trace, "allocate", "alloc"), 0, 0);
        log.record(
            LogEvent::new(PoolLogLevel::Error, "chunk_alloc", "resource_exhausted")
                .outcome("failed")
                .size(64),
            128,
            0,
        );
        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].trace_id, "pool::chunk_alloc::0000000000000001");
        assert_eq!(drained[0].heap_size, 128);
        assert_eq!(log.records().count(), 0);
    }
}
