//! Frame - a slot in the buffer pool.
//!
//! A frame is split in two:
//! - [`Frame`] owns the page bytes behind an `RwLock`, so a pinned page can
//!   be read or written without holding the pool lock
//! - [`FrameHeader`] is the bookkeeping (which page, fix count, dirty flag)
//!   and only ever lives inside the pool's locked state

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::PageId;
use crate::storage::page::Page;

/// Page buffer of one frame.
///
/// Frames are allocated once when the pool is created and never freed
/// individually; only the page they hold changes.
pub struct Frame {
    page: RwLock<Page>,
}

impl Frame {
    /// Create a frame with a zeroed buffer.
    pub fn new() -> Self {
        Self {
            page: RwLock::new(Page::new()),
        }
    }

    /// Acquire read lock on the page.
    #[inline]
    pub fn page(&self) -> RwLockReadGuard<'_, Page> {
        self.page.read()
    }

    /// Acquire write lock on the page.
    #[inline]
    pub fn page_mut(&self) -> RwLockWriteGuard<'_, Page> {
        self.page.write()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame metadata, guarded by the pool lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameHeader {
    /// Which page is currently loaded, or None if the frame is empty.
    page_id: Option<PageId>,

    /// Number of outstanding pins.
    pin_count: u32,

    /// Whether the page has been modified since it was loaded or flushed.
    is_dirty: bool,
}

impl FrameHeader {
    /// Header of an empty, unpinned, clean frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the page ID of the loaded page.
    #[inline]
    pub fn page_id(&self) -> Option<PageId> {
        self.page_id
    }

    /// Page ID, or [`PageId::INVALID`] for an empty frame.
    #[inline]
    pub fn page_id_or_invalid(&self) -> PageId {
        self.page_id.unwrap_or(PageId::INVALID)
    }

    /// Install a freshly read page: one pin, clean.
    pub fn load(&mut self, page_id: PageId) {
        debug_assert_eq!(self.pin_count, 0, "loading into a pinned frame");
        self.page_id = Some(page_id);
        self.pin_count = 1;
        self.is_dirty = false;
    }

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub fn pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.pin_count
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// Returns `None` instead of going below zero.
    #[inline]
    pub fn unpin(&mut self) -> Option<u32> {
        self.pin_count = self.pin_count.checked_sub(1)?;
        Some(self.pin_count)
    }

    /// Get the current pin count.
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    /// Check if the frame is currently pinned.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.is_dirty = false;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Dirty and unpinned: what a pool-wide flush writes back.
    #[inline]
    pub fn needs_flush(&self) -> bool {
        self.is_dirty && self.page_id.is_some() && !self.is_pinned()
    }

    /// Forget the loaded page. The frame must be unpinned.
    pub fn reset(&mut self) {
        debug_assert!(!self.is_pinned(), "resetting a pinned frame");
        *self = Self::new();
    }
}
