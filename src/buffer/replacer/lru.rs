//! LRU (Least Recently Used) replacement policy.

use std::collections::VecDeque;

use crate::buffer::replacer::Replacer;
use crate::common::FrameId;

/// LRU over unpinned frames, ordered by when they were last unpinned.
///
/// Recency is a queue of frame indices rather than links between frames:
/// the front is the least recently unpinned frame (next victim), the back
/// the most recent. A pinned frame is not in the queue at all.
pub struct LruReplacer {
    /// Evictable frames, least recently unpinned first.
    queue: VecDeque<FrameId>,

    /// Membership flag per frame, mirrors `queue`.
    in_queue: Vec<bool>,
}

impl LruReplacer {
    /// Create an LRU replacer; frames start queued in slot order.
    pub fn new(pool_size: usize) -> Self {
        Self {
            queue: (0..pool_size).map(FrameId::new).collect(),
            in_queue: vec![true; pool_size],
        }
    }

    /// Evictable frames from least to most recently unpinned.
    pub fn order(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.queue.iter().copied()
    }

    fn unlink(&mut self, frame_id: FrameId) {
        if std::mem::replace(&mut self.in_queue[frame_id.0], false) {
            if let Some(pos) = self.queue.iter().position(|&f| f == frame_id) {
                self.queue.remove(pos);
            }
        }
    }
}

impl Replacer for LruReplacer {
    /// Recency is taken at unpin time, so a pin only matters through
    /// `set_evictable(.., false)`.
    fn record_access(&mut self, _frame_id: FrameId) {}

    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) {
        if !evictable {
            self.unlink(frame_id);
        } else if !self.in_queue[frame_id.0] {
            self.in_queue[frame_id.0] = true;
            self.queue.push_back(frame_id);
        }
    }

    fn evict(&mut self) -> Option<FrameId> {
        let frame_id = self.queue.pop_front()?;
        self.in_queue[frame_id.0] = false;
        Some(frame_id)
    }

    /// Queues the frame at the front, ahead of every cached page.
    fn set_free(&mut self, frame_id: FrameId) {
        self.unlink(frame_id);
        self.in_queue[frame_id.0] = true;
        self.queue.push_front(frame_id);
    }

    fn size(&self) -> usize {
        self.queue.len()
    }
}
