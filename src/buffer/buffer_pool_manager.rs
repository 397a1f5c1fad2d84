//! Buffer Pool Manager - the core page caching layer.
//!
//! The [`BufferPoolManager`] provides:
//! - Page caching between the page file and memory
//! - Pin-based reference counting
//! - Dirty page write-back on eviction, on request, and at shutdown
//! - FIFO, LRU or CLOCK victim selection

use std::path::{Path, PathBuf};

use log::{debug, error, trace, warn};
use parking_lot::Mutex;

use crate::buffer::replacer::{new_replacer, Replacer};
use crate::buffer::{BufferPoolStats, Frame, FrameHeader, PageHandle, PageTable};
use crate::common::{BufferPoolConfig, Error, FrameId, PageId, ReplacementStrategy, Result};
use crate::storage::PageFile;

/// Everything guarded by the pool lock.
struct PoolState {
    /// Metadata for each frame, indexed by `FrameId`.
    headers: Vec<FrameHeader>,

    /// Maps resident page IDs to frame IDs.
    page_table: PageTable,

    /// Eviction policy for selecting victim frames.
    replacer: Box<dyn Replacer>,

    /// The backing page file; `None` once the pool is shut down.
    page_file: Option<PageFile>,
}

impl PoolState {
    fn ensure_open(&self) -> Result<()> {
        if self.page_file.is_some() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }
}

/// Manages a fixed pool of frames caching pages of one page file.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                    BufferPoolManager                        │
/// │  ┌───────────────────── Mutex<PoolState> ────────────────┐  │
/// │  │ page_table     headers        replacer     page_file  │  │
/// │  │ PageId → Fid   pin/dirty/pid  FIFO|LRU|CLOCK  PageFile │  │
/// │  └────────────────────────────────────────────────────────┘  │
/// │  frames: Vec<Frame>   [Frame0] [Frame1] [Frame2] ...         │
/// │  stats:  BufferPoolStats                                     │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// One coarse lock covers the page table, frame metadata, the replacer and
/// the page file, and it stays held across page file I/O. Every operation
/// is therefore atomic with respect to every other, and two pins can never
/// pick the same victim. Page bytes live outside the lock in per-frame
/// `RwLock`s so pinned pages can be used concurrently; pinned frames are
/// never chosen as victims, so their bytes cannot change underneath a
/// client.
///
/// A pin that finds every frame pinned fails at once with
/// [`Error::BufferPoolFull`]; it does not wait for an unpin.
///
/// # Usage
/// ```no_run
/// use pagepool::{BufferPoolConfig, BufferPoolManager, PageId, ReplacementStrategy};
///
/// let config = BufferPoolConfig::new()
///     .with_pool_size(3)
///     .with_strategy(ReplacementStrategy::Lru);
/// let bpm = BufferPoolManager::new("data.bin", config)?;
///
/// let handle = bpm.pin_page(PageId::new(0))?;
/// handle.write().as_mut_slice()[0] = 0xAB;
/// bpm.mark_dirty(&handle)?;
/// bpm.unpin_page(&handle)?;
///
/// bpm.shutdown()?;
/// # Ok::<(), pagepool::Error>(())
/// ```
pub struct BufferPoolManager {
    /// Fixed pool of frame buffers allocated at startup.
    frames: Vec<Frame>,

    /// Page table, frame metadata, replacer and page file.
    state: Mutex<PoolState>,

    /// I/O and cache statistics.
    stats: BufferPoolStats,

    /// Page file this pool caches.
    path: PathBuf,

    /// Pool size and strategy (immutable after construction).
    config: BufferPoolConfig,
}

impl BufferPoolManager {
    /// Open `path` and build a pool of empty frames over it.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if the pool would have no frames
    /// - `Error::FileNotFound` if the page file does not exist
    pub fn new<P: AsRef<Path>>(path: P, config: BufferPoolConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let page_file = PageFile::open(path)?;
        let pool_size = config.pool_size;

        debug!(
            "opening buffer pool on {} ({} frames, {} bytes, {})",
            path.display(),
            pool_size,
            config.pool_size_bytes(),
            config.strategy
        );

        Ok(Self {
            frames: (0..pool_size).map(|_| Frame::new()).collect(),
            state: Mutex::new(PoolState {
                headers: vec![FrameHeader::new(); pool_size],
                page_table: PageTable::with_capacity(pool_size),
                replacer: new_replacer(config.strategy, pool_size),
                page_file: Some(page_file),
            }),
            stats: BufferPoolStats::new(),
            path: path.to_path_buf(),
            config,
        })
    }

    /// Shorthand for [`BufferPoolManager::new`] without building a config.
    pub fn open<P: AsRef<Path>>(
        path: P,
        pool_size: usize,
        strategy: ReplacementStrategy,
    ) -> Result<Self> {
        let config = BufferPoolConfig::new()
            .with_pool_size(pool_size)
            .with_strategy(strategy);
        Self::new(path, config)
    }

    /// Flush unpinned dirty pages and close the page file.
    ///
    /// After a successful shutdown every operation fails with
    /// `Error::NotInitialized`.
    ///
    /// # Errors
    /// - `Error::HavePinnedPage` if any frame is still pinned. Nothing is
    ///   torn down and the pool stays usable; unpin and retry.
    /// - Page file errors from the final flush or close
    pub fn shutdown(&self) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.ensure_open()?;

        self.flush_unpinned(state)?;

        if let Some(header) = state.headers.iter().find(|h| h.is_pinned()) {
            let page_id = header.page_id_or_invalid();
            warn!(
                "refusing to shut down buffer pool on {}: {} is pinned",
                self.path.display(),
                page_id
            );
            return Err(Error::HavePinnedPage(page_id));
        }

        state.page_table.clear();
        state.headers.iter_mut().for_each(FrameHeader::reset);
        if let Some(page_file) = state.page_file.take() {
            page_file.close()?;
        }

        debug!("buffer pool on {} shut down", self.path.display());
        Ok(())
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Pin page `page_id`, loading it if it is not resident.
    ///
    /// A miss asks the replacer for a victim, writes the victim back if it
    /// is dirty, grows the page file if `page_id` lies past its end, and
    /// reads the page into the victim frame.
    ///
    /// # Errors
    /// - `Error::InvalidPageId` for the sentinel page id
    /// - `Error::BufferPoolFull` if every frame is pinned
    /// - Page file errors from the write-back, grow or read, unchanged. The
    ///   pool is left consistent: the victim is either still holding its
    ///   old page or empty.
    pub fn pin_page(&self, page_id: PageId) -> Result<PageHandle<'_>> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id));
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.ensure_open()?;

        if let Some(frame_id) = state.page_table.get(page_id) {
            // Cache hit
            let header = &mut state.headers[frame_id.0];
            debug_assert_eq!(header.page_id(), Some(page_id));
            if header.pin() == 1 {
                state.replacer.set_evictable(frame_id, false);
            }
            state.replacer.record_access(frame_id);
            self.stats.record_hit();

            trace!("pin {} hit in {}", page_id, frame_id);
            return Ok(PageHandle::new(self, frame_id, page_id));
        }

        self.stats.record_miss();
        let Some(frame_id) = state.replacer.evict() else {
            trace!("pin {} failed: all {} frames pinned", page_id, self.frames.len());
            return Err(Error::BufferPoolFull);
        };

        if let Err(e) = self.load_page(state, frame_id, page_id) {
            // A failed write-back leaves the old page cached; any later
            // failure leaves the frame empty
            if state.headers[frame_id.0].page_id().is_some() {
                state.replacer.set_evictable(frame_id, true);
            } else {
                state.replacer.set_free(frame_id);
            }
            error!("failed to load {} into {}: {}", page_id, frame_id, e);
            return Err(e);
        }

        trace!("pin {} loaded into {}", page_id, frame_id);
        Ok(PageHandle::new(self, frame_id, page_id))
    }

    /// Release one pin on the handle's page.
    ///
    /// When the pin count reaches zero the frame becomes a replacement
    /// candidate again (for LRU: the most recently used one).
    ///
    /// # Errors
    /// `Error::PageNotPinned` if the page is not resident or has no pins.
    pub fn unpin_page(&self, handle: &PageHandle<'_>) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.ensure_open()?;

        let page_id = handle.page_id();
        let frame_id = state
            .page_table
            .get(page_id)
            .ok_or(Error::PageNotPinned(page_id))?;

        match state.headers[frame_id.0].unpin() {
            Some(0) => state.replacer.set_evictable(frame_id, true),
            Some(_) => {}
            None => return Err(Error::PageNotPinned(page_id)),
        }
        Ok(())
    }

    /// Mark the handle's page as modified.
    ///
    /// # Errors
    /// `Error::PageNotPinned` if the page is not resident.
    pub fn mark_dirty(&self, handle: &PageHandle<'_>) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.ensure_open()?;

        let page_id = handle.page_id();
        let frame_id = state
            .page_table
            .get(page_id)
            .ok_or(Error::PageNotPinned(page_id))?;
        state.headers[frame_id.0].mark_dirty();
        Ok(())
    }

    /// Remove an unpinned page from the pool without writing it back.
    ///
    /// Unsaved changes are lost. Does nothing if the page is not resident.
    ///
    /// # Errors
    /// `Error::FrameInUse` if the page is pinned.
    pub fn discard_page(&self, page_id: PageId) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.ensure_open()?;

        let Some(frame_id) = state.page_table.get(page_id) else {
            return Ok(());
        };
        let header = &mut state.headers[frame_id.0];
        if header.is_pinned() {
            return Err(Error::FrameInUse(page_id));
        }

        state.page_table.remove(page_id);
        header.reset();
        self.frames[frame_id.0].page_mut().reset();
        state.replacer.set_free(frame_id);

        trace!("discarded {} from {}", page_id, frame_id);
        Ok(())
    }

    // ========================================================================
    // Public API: Flush
    // ========================================================================

    /// Write the handle's page back if it is dirty, even while pinned.
    ///
    /// Does nothing if the page is not resident.
    pub fn force_page(&self, handle: &PageHandle<'_>) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.ensure_open()?;

        if let Some(frame_id) = state.page_table.get(handle.page_id()) {
            self.write_back(state, frame_id)?;
        }
        Ok(())
    }

    /// Write back every dirty page that is not pinned.
    ///
    /// Pinned dirty pages are skipped and stay dirty.
    pub fn force_flush_pool(&self) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.ensure_open()?;

        let flushed = self.flush_unpinned(state)?;
        trace!("flushed {} pages", flushed);
        Ok(())
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Page held by each frame, in frame order; `PageId::INVALID` if empty.
    pub fn frame_contents(&self) -> Vec<PageId> {
        let state = self.state.lock();
        state.headers.iter().map(FrameHeader::page_id_or_invalid).collect()
    }

    /// Dirty flag of each frame, in frame order.
    pub fn dirty_flags(&self) -> Vec<bool> {
        let state = self.state.lock();
        state.headers.iter().map(FrameHeader::is_dirty).collect()
    }

    /// Pin count of each frame, in frame order.
    pub fn fix_counts(&self) -> Vec<u32> {
        let state = self.state.lock();
        state.headers.iter().map(FrameHeader::pin_count).collect()
    }

    /// Pages read from the page file since the pool was created.
    pub fn num_read_io(&self) -> u64 {
        self.stats.pages_read()
    }

    /// Pages written to the page file since the pool was created.
    pub fn num_write_io(&self) -> u64 {
        self.stats.pages_written()
    }

    /// Get buffer pool statistics.
    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    /// Get the pool size.
    pub fn pool_size(&self) -> usize {
        self.config.pool_size
    }

    /// Replacement strategy in use.
    pub fn strategy(&self) -> ReplacementStrategy {
        self.config.strategy
    }

    /// Path of the cached page file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of resident pages.
    pub fn page_count(&self) -> usize {
        self.state.lock().page_table.len()
    }

    /// False once the pool has been shut down.
    pub fn is_open(&self) -> bool {
        self.state.lock().page_file.is_some()
    }

    // ========================================================================
    // Internal
    // ========================================================================

    pub(crate) fn frame(&self, frame_id: FrameId) -> &Frame {
        &self.frames[frame_id.0]
    }

    /// Repurpose the unpinned victim `frame_id` to hold `page_id`.
    fn load_page(&self, state: &mut PoolState, frame_id: FrameId, page_id: PageId) -> Result<()> {
        let frame = &self.frames[frame_id.0];
        let page_file = state.page_file.as_mut().ok_or(Error::NotInitialized)?;
        let header = &mut state.headers[frame_id.0];
        debug_assert!(!header.is_pinned(), "{} chosen as victim while pinned", frame_id);

        if let Some(old_page_id) = header.page_id() {
            if header.is_dirty() {
                page_file.write_page(old_page_id, &frame.page())?;
                header.clear_dirty();
                self.stats.record_write();
            }
            state.page_table.remove(old_page_id);
            header.reset();
            self.stats.record_eviction();
            trace!("evicted {} from {}", old_page_id, frame_id);
        }

        if page_id.0 >= page_file.page_count() {
            page_file.ensure_capacity(page_id.required_pages())?;
        }
        page_file.read_page(page_id, &mut frame.page_mut())?;
        self.stats.record_read();

        header.load(page_id);
        state.page_table.insert(page_id, frame_id);
        state.replacer.record_access(frame_id);
        Ok(())
    }

    /// Write a frame back if dirty. Returns whether anything was written.
    fn write_back(&self, state: &mut PoolState, frame_id: FrameId) -> Result<bool> {
        let page_file = state.page_file.as_mut().ok_or(Error::NotInitialized)?;
        let header = &mut state.headers[frame_id.0];

        let Some(page_id) = header.page_id() else {
            return Ok(false);
        };
        if !header.is_dirty() {
            return Ok(false);
        }

        page_file.write_page(page_id, &self.frames[frame_id.0].page())?;
        header.clear_dirty();
        self.stats.record_write();
        Ok(true)
    }

    /// Write back every dirty, unpinned frame. Returns how many were written.
    fn flush_unpinned(&self, state: &mut PoolState) -> Result<usize> {
        let mut flushed = 0;
        for frame_id in (0..self.frames.len()).map(FrameId::new) {
            if state.headers[frame_id.0].needs_flush() && self.write_back(state, frame_id)? {
                flushed += 1;
            }
        }
        Ok(flushed)
    }
}

impl Drop for BufferPoolManager {
    fn drop(&mut self) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.page_file.is_none() {
            return;
        }

        if let Err(e) = self.flush_unpinned(state) {
            error!("flush of {} on drop failed: {}", self.path.display(), e);
        }
        if let Some(page_file) = state.page_file.take() {
            if let Err(e) = page_file.close() {
                error!("close of {} on drop failed: {}", self.path.display(), e);
            }
        }
    }
}
