//! Client view of a pinned page.

use std::fmt;

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::common::{FrameId, PageId};
use crate::storage::page::Page;

use super::buffer_pool_manager::BufferPoolManager;

/// A page pinned by [`BufferPoolManager::pin_page`].
///
/// The handle pairs the page number with the frame holding it. Its bytes
/// are reachable through [`read`](Self::read) and [`write`](Self::write)
/// until the matching [`BufferPoolManager::unpin_page`]; after that the
/// frame may be recycled for another page and the handle must not be used
/// to touch data.
///
/// Writing through the handle does not mark the page dirty; call
/// [`BufferPoolManager::mark_dirty`] for that.
///
/// Do not hold a [`read`](Self::read) or [`write`](Self::write) guard across
/// a call into the pool: the pool takes the same page lock when it writes a
/// page back.
///
/// # Example
/// ```ignore
/// let handle = bpm.pin_page(PageId::new(0))?;
/// handle.write().as_mut_slice()[0] = 0xAB;
/// bpm.mark_dirty(&handle)?;
/// bpm.unpin_page(&handle)?;
/// ```
pub struct PageHandle<'a> {
    bpm: &'a BufferPoolManager,
    frame_id: FrameId,
    page_id: PageId,
}

impl<'a> PageHandle<'a> {
    pub(crate) fn new(bpm: &'a BufferPoolManager, frame_id: FrameId, page_id: PageId) -> Self {
        Self {
            bpm,
            frame_id,
            page_id,
        }
    }

    /// Get the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Get the frame ID.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Shared access to the page bytes.
    pub fn read(&self) -> RwLockReadGuard<'a, Page> {
        self.bpm.frame(self.frame_id).page()
    }

    /// Exclusive access to the page bytes.
    pub fn write(&self) -> RwLockWriteGuard<'a, Page> {
        self.bpm.frame(self.frame_id).page_mut()
    }
}

impl fmt::Debug for PageHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageHandle")
            .field("page_id", &self.page_id)
            .field("frame_id", &self.frame_id)
            .finish()
    }
}
