//! Buffer pool I/O and cache statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by the buffer pool.
///
/// Counters only ever grow; they start at zero when the pool is created.
/// Every increment happens under the pool lock, exactly once per page store
/// read or write. They are atomics so they can be read without that lock.
///
/// # Example
/// ```
/// use pagepool::BufferPoolStats;
///
/// let stats = BufferPoolStats::new();
/// stats.record_read();
/// assert_eq!(stats.pages_read(), 1);
/// ```
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    evictions: AtomicU64,
    pages_read: AtomicU64,
    pages_written: AtomicU64,
}

impl BufferPoolStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A pin found its page already resident.
    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A pin had to load its page.
    pub fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// A resident page was dropped to make room for another.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// One page was read from the page store.
    pub fn record_read(&self) {
        self.pages_read.fetch_add(1, Ordering::Relaxed);
    }

    /// One page was written to the page store.
    pub fn record_write(&self) {
        self.pages_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Pages read from the page store so far.
    pub fn pages_read(&self) -> u64 {
        self.pages_read.load(Ordering::Relaxed)
    }

    /// Pages written to the page store so far.
    pub fn pages_written(&self) -> u64 {
        self.pages_written.load(Ordering::Relaxed)
    }

    /// Copy all counters out at once.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            pages_read: self.pages_read(),
            pages_written: self.pages_written(),
        }
    }
}

/// A point-in-time copy of [`BufferPoolStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
    pub pages_read: u64,
    pub pages_written: u64,
}

impl StatsSnapshot {
    /// Fraction of pins served without I/O (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ reads: {}, writes: {}, hits: {}, misses: {}, evictions: {}, hit_rate: {:.2}% }}",
            self.pages_read,
            self.pages_written,
            self.cache_hits,
            self.cache_misses,
            self.evictions,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_start_at_zero() {
        let stats = BufferPoolStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
        assert_eq!(stats.snapshot().hit_rate(), 0.0);
    }

    #[test]
    fn test_stats_counters() {
        let stats = BufferPoolStats::new();
        for _ in 0..7 {
            stats.record_hit();
        }
        for _ in 0..3 {
            stats.record_miss();
            stats.record_read();
        }
        stats.record_write();
        stats.record_eviction();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cache_hits, 7);
        assert_eq!(snapshot.pages_read, 3);
        assert_eq!(snapshot.pages_written, 1);
        assert_eq!(snapshot.evictions, 1);
        assert_eq!(snapshot.hit_rate(), 0.7);
    }

    #[test]
    fn test_stats_display() {
        let snapshot = StatsSnapshot {
            cache_hits: 80,
            cache_misses: 20,
            evictions: 5,
            pages_read: 20,
            pages_written: 4,
        };
        let display = format!("{}", snapshot);

        assert!(display.contains("reads: 20"));
        assert!(display.contains("writes: 4"));
        assert!(display.contains("80.00%"));
    }
}
