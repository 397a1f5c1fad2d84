//! Configuration for pagepool.
//!
//! Compile-time constants plus the [`BufferPoolConfig`] handed to
//! [`BufferPoolManager::new`](crate::buffer::BufferPoolManager::new).

use std::fmt;
use std::str::FromStr;

use crate::common::{Error, Result};

/// Size of a page in bytes (4KB).
///
/// Every page store read or write transfers exactly this many bytes.
/// Page N lives at file offset `N × PAGE_SIZE`.
pub const PAGE_SIZE: usize = 4096;

/// Number of frames used when no pool size is configured.
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Full turns of the clock hand before CLOCK gives up on finding a victim.
///
/// The first turn may only clear reference bits; the second is guaranteed
/// to find any unpinned frame.
pub const CLOCK_SWEEP_ROUNDS: usize = 2;

/// Page replacement policy used to pick eviction victims.
///
/// This is a closed set: LFU and LRU-K are recognised by name when parsing
/// but rejected with [`Error::UnsupportedStrategy`] so that a bad choice
/// fails at pool initialization rather than at the first eviction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplacementStrategy {
    /// Evict in order of first load, ignoring later use.
    #[default]
    Fifo,
    /// Evict the frame that was unpinned longest ago.
    Lru,
    /// Second-chance sweep over a reference bit per frame.
    Clock,
}

impl ReplacementStrategy {
    /// All supported strategies, in declaration order.
    pub const ALL: [ReplacementStrategy; 3] = [
        ReplacementStrategy::Fifo,
        ReplacementStrategy::Lru,
        ReplacementStrategy::Clock,
    ];

    /// Lower-case name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            ReplacementStrategy::Fifo => "fifo",
            ReplacementStrategy::Lru => "lru",
            ReplacementStrategy::Clock => "clock",
        }
    }
}

impl fmt::Display for ReplacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReplacementStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(ReplacementStrategy::Fifo),
            "lru" => Ok(ReplacementStrategy::Lru),
            "clock" => Ok(ReplacementStrategy::Clock),
            "lfu" | "lru-k" | "lru_k" | "lruk" => Err(Error::UnsupportedStrategy(s.to_string())),
            _ => Err(Error::InvalidConfig(format!(
                "unknown replacement strategy '{}'",
                s
            ))),
        }
    }
}

/// Settings for a buffer pool instance.
///
/// # Example
/// ```
/// use pagepool::common::config::{BufferPoolConfig, ReplacementStrategy};
///
/// let config = BufferPoolConfig::new()
///     .with_pool_size(3)
///     .with_strategy(ReplacementStrategy::Lru);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of frames in the pool.
    pub pool_size: usize,
    /// Victim selection policy.
    pub strategy: ReplacementStrategy,
}

impl BufferPoolConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of frames.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Set the replacement strategy.
    pub fn with_strategy(mut self, strategy: ReplacementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check the configuration before any frame is allocated.
    ///
    /// # Errors
    /// `Error::InvalidConfig` if the pool would have no frames.
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::InvalidConfig("pool_size must be > 0".to_string()));
        }
        Ok(())
    }

    /// Total bytes of page buffers the pool will allocate.
    pub fn pool_size_bytes(&self) -> usize {
        self.pool_size * PAGE_SIZE
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            strategy: ReplacementStrategy::default(),
        }
    }
}
