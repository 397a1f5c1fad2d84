//! FIFO (First-In-First-Out) replacement policy.

use crate::buffer::replacer::Replacer;
use crate::common::FrameId;

/// Cyclic FIFO over frame slots.
///
/// Frames are filled and recycled in slot order: the search for a victim
/// starts just after the previous victim and takes the first evictable frame
/// within one full turn. Because every load lands in the slot the cursor
/// points at, slot order is load order, and pinning or unpinning a page
/// later never moves it in the queue.
pub struct FifoReplacer {
    /// Evictable flag per frame (true = unpinned).
    evictable: Vec<bool>,

    /// Next slot to inspect.
    cursor: FrameId,

    /// Number of `true` entries in `evictable`.
    size: usize,
}

impl FifoReplacer {
    /// Create a FIFO replacer over `pool_size` empty, evictable frames.
    pub fn new(pool_size: usize) -> Self {
        Self {
            evictable: vec![true; pool_size],
            cursor: FrameId::new(0),
            size: pool_size,
        }
    }
}

impl Replacer for FifoReplacer {
    /// FIFO ignores accesses; only load order matters.
    fn record_access(&mut self, _frame_id: FrameId) {}

    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) {
        let slot = &mut self.evictable[frame_id.0];
        if *slot != evictable {
            *slot = evictable;
            if evictable {
                self.size += 1;
            } else {
                self.size -= 1;
            }
        }
    }

    fn evict(&mut self) -> Option<FrameId> {
        let pool_size = self.evictable.len();
        let mut frame_id = self.cursor;

        for _ in 0..pool_size {
            if self.evictable[frame_id.0] {
                self.evictable[frame_id.0] = false;
                self.size -= 1;
                self.cursor = frame_id.next(pool_size);
                return Some(frame_id);
            }
            frame_id = frame_id.next(pool_size);
        }
        None
    }

    /// Rewinds the cursor to the freed slot.
    fn set_free(&mut self, frame_id: FrameId) {
        self.set_evictable(frame_id, true);
        self.cursor = frame_id;
    }

    fn size(&self) -> usize {
        self.size
    }
}
