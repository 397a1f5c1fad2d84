//! Eviction policy implementations (replacers).
//!
//! - [`FifoReplacer`] - Cyclic scan from just after the last victim
//! - [`LruReplacer`] - Least recently unpinned frame first
//! - [`ClockReplacer`] - Second chance over a reference bit
//!
//! Every replacer starts with all frames evictable: an empty frame is an
//! unpinned frame. Replacers are driven by the buffer pool under its lock,
//! so they carry no synchronization of their own.

mod clock;
mod fifo;
mod lru;

pub use clock::ClockReplacer;
pub use fifo::FifoReplacer;
pub use lru::LruReplacer;

use crate::common::{FrameId, ReplacementStrategy};

/// A page replacement policy over a fixed set of frames.
pub trait Replacer: Send {
    /// Record that the frame was just pinned (loaded or hit).
    fn record_access(&mut self, frame_id: FrameId);

    /// Mark a frame as evictable (pin count dropped to 0) or not (pinned).
    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool);

    /// Select a victim frame for eviction.
    ///
    /// The victim is no longer evictable on return. Returns `None` if every
    /// frame is pinned.
    fn evict(&mut self) -> Option<FrameId>;

    /// Hand back a frame that holds no page.
    ///
    /// The frame becomes evictable and is the next victim, ahead of every
    /// frame still caching a page.
    fn set_free(&mut self, frame_id: FrameId);

    /// Number of evictable frames.
    fn size(&self) -> usize;
}

/// Build the replacer for `strategy` over `pool_size` frames.
pub fn new_replacer(strategy: ReplacementStrategy, pool_size: usize) -> Box<dyn Replacer> {
    match strategy {
        ReplacementStrategy::Fifo => Box::new(FifoReplacer::new(pool_size)),
        ReplacementStrategy::Lru => Box::new(LruReplacer::new(pool_size)),
        ReplacementStrategy::Clock => Box::new(ClockReplacer::new(pool_size)),
    }
}
