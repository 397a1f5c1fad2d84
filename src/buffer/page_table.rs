//! Page table mapping resident page numbers to frames.

use std::collections::HashMap;

use crate::common::{FrameId, PageId};

/// Maps each resident page to the frame caching it.
///
/// At most one frame holds a given page. The table is owned by the pool
/// state and only touched under the pool lock.
#[derive(Debug, Default)]
pub struct PageTable {
    entries: HashMap<PageId, FrameId>,
}

impl PageTable {
    /// Creates an empty table sized for `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Looks up the frame holding `page_id`.
    #[inline]
    pub fn get(&self, page_id: PageId) -> Option<FrameId> {
        self.entries.get(&page_id).copied()
    }

    /// Maps `page_id` to `frame_id`.
    ///
    /// # Panics
    /// In debug builds, if the page is already mapped. A second mapping
    /// would let two frames cache the same page.
    pub fn insert(&mut self, page_id: PageId, frame_id: FrameId) {
        let prev = self.entries.insert(page_id, frame_id);
        debug_assert!(prev.is_none(), "{} mapped twice", page_id);
    }

    /// Removes the mapping for `page_id`, returning the frame it pointed at.
    pub fn remove(&mut self, page_id: PageId) -> Option<FrameId> {
        self.entries.remove(&page_id)
    }

    /// Number of resident pages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
