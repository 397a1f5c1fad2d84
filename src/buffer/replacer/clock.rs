//! CLOCK (second chance) replacement policy.

use crate::buffer::replacer::Replacer;
use crate::common::config::CLOCK_SWEEP_ROUNDS;
use crate::common::FrameId;

/// Clock replacement algorithm.
///
/// Frames sit on a circle with a persistent hand and one reference bit each.
/// Pinning a page sets its bit. When selecting a victim the hand moves
/// forward from just after the previous victim:
/// 1. Bit set: clear it and move on (the frame's second chance)
/// 2. Bit clear and frame pinned: move on, bit untouched
/// 3. Bit clear and frame unpinned: that frame is the victim
///
/// The sweep stops after [`CLOCK_SWEEP_ROUNDS`] full turns.
pub struct ClockReplacer {
    /// Reference bit per frame.
    referenced: Vec<bool>,

    /// Evictable flag per frame (true = unpinned).
    evictable: Vec<bool>,

    /// Clock hand: next frame to inspect.
    hand: FrameId,

    /// Number of `true` entries in `evictable`.
    size: usize,
}

impl ClockReplacer {
    /// Creates a clock over `pool_size` empty, evictable, unreferenced frames.
    pub fn new(pool_size: usize) -> Self {
        Self {
            referenced: vec![false; pool_size],
            evictable: vec![true; pool_size],
            hand: FrameId::new(0),
            size: pool_size,
        }
    }

    /// Current reference bit of a frame.
    pub fn is_referenced(&self, frame_id: FrameId) -> bool {
        self.referenced[frame_id.0]
    }
}

impl Replacer for ClockReplacer {
    fn record_access(&mut self, frame_id: FrameId) {
        self.referenced[frame_id.0] = true;
    }

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
        let mut frame_id = self.hand;

        for _ in 0..CLOCK_SWEEP_ROUNDS * pool_size {
            if self.referenced[frame_id.0] {
                self.referenced[frame_id.0] = false;
            } else if self.evictable[frame_id.0] {
                self.evictable[frame_id.0] = false;
                self.size -= 1;
                self.hand = frame_id.next(pool_size);
                return Some(frame_id);
            }
            frame_id = frame_id.next(pool_size);
        }
        None
    }

    /// Clears the bit and parks the hand on the freed frame.
    fn set_free(&mut self, frame_id: FrameId) {
        self.set_evictable(frame_id, true);
        self.referenced[frame_id.0] = false;
        self.hand = frame_id;
    }

    fn size(&self) -> usize {
        self.size
    }
}
