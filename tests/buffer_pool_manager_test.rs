//! Buffer Pool Manager Tests
//!
//! Pin protocol, replacement order of each strategy, flushing and shutdown,
//! all through the public API against a scratch page file.

use std::fs::OpenOptions;

use pagepool::{BufferPoolManager, Error, PageFile, PageId, ReplacementStrategy, PAGE_SIZE};
use tempfile::tempdir;

fn create_bpm(
    pool_size: usize,
    strategy: ReplacementStrategy,
) -> (BufferPoolManager, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.bin");
    PageFile::create(&path).unwrap().close().unwrap();
    (BufferPoolManager::open(&path, pool_size, strategy).unwrap(), dir)
}

/// Pin and immediately unpin each page, in order.
fn touch(bpm: &BufferPoolManager, pages: &[u32]) {
    for &p in pages {
        let handle = bpm.pin_page(PageId::new(p)).unwrap();
        bpm.unpin_page(&handle).unwrap();
    }
}

fn contents(bpm: &BufferPoolManager) -> Vec<u32> {
    bpm.frame_contents().iter().map(|p| p.0).collect()
}

/// Helper to write a string to page data.
fn copy_string(data: &mut [u8], s: &str) {
    let bytes = s.as_bytes();
    data[..bytes.len()].copy_from_slice(bytes);
    data[bytes.len()] = 0; // null terminator
}

/// Helper to read a null-terminated string from page data.
fn read_string(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).to_string()
}

// ============================================================================
// Round trip
// ============================================================================

/// Bytes written, marked dirty and forced survive closing and reopening.
#[test]
fn test_round_trip_through_page_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.bin");
    PageFile::create(&path).unwrap().close().unwrap();

    for strategy in ReplacementStrategy::ALL {
        let text = format!("written under {}", strategy);
        {
            let bpm = BufferPoolManager::open(&path, 3, strategy).unwrap();
            let handle = bpm.pin_page(PageId::new(2)).unwrap();
            copy_string(handle.write().as_mut_slice(), &text);
            bpm.mark_dirty(&handle).unwrap();
            bpm.force_page(&handle).unwrap();
            assert_eq!(bpm.num_write_io(), 1);
            bpm.unpin_page(&handle).unwrap();
            bpm.shutdown().unwrap();
        }

        let bpm = BufferPoolManager::open(&path, 3, strategy).unwrap();
        let handle = bpm.pin_page(PageId::new(2)).unwrap();
        assert_eq!(read_string(handle.read().as_slice()), text);
        bpm.unpin_page(&handle).unwrap();
        bpm.shutdown().unwrap();
    }
}

// ============================================================================
// Capacity
// ============================================================================

/// With every frame pinned the next distinct pin fails and changes nothing.
#[test]
fn test_capacity_exhaustion() {
    for strategy in ReplacementStrategy::ALL {
        let (bpm, _dir) = create_bpm(3, strategy);

        let handles: Vec<_> = (0..3)
            .map(|p| bpm.pin_page(PageId::new(p)).unwrap())
            .collect();

        assert!(matches!(
            bpm.pin_page(PageId::new(3)),
            Err(Error::BufferPoolFull)
        ));
        assert_eq!(contents(&bpm), vec![0, 1, 2], "{}", strategy);
        assert_eq!(bpm.fix_counts(), vec![1, 1, 1]);
        assert_eq!(bpm.num_read_io(), 3);

        // Already resident pages can still be pinned
        let extra = bpm.pin_page(PageId::new(1)).unwrap();
        assert_eq!(bpm.fix_counts(), vec![1, 2, 1]);
        bpm.unpin_page(&extra).unwrap();

        // One unpin frees exactly one victim
        bpm.unpin_page(&handles[1]).unwrap();
        let handle = bpm.pin_page(PageId::new(3)).unwrap();
        assert_eq!(contents(&bpm), vec![0, 3, 2], "{}", strategy);
        bpm.unpin_page(&handle).unwrap();
    }
}

// ============================================================================
// Replacement order
// ============================================================================

/// FIFO evicts the first page loaded, whatever the unpin order.
#[test]
fn test_fifo_order() {
    let (bpm, _dir) = create_bpm(3, ReplacementStrategy::Fifo);

    let handles: Vec<_> = (0..3)
        .map(|p| bpm.pin_page(PageId::new(p)).unwrap())
        .collect();
    for handle in handles.iter().rev() {
        bpm.unpin_page(handle).unwrap();
    }

    touch(&bpm, &[3]);
    assert_eq!(contents(&bpm), vec![3, 1, 2]);

    // Re-using page 1 does not protect it
    touch(&bpm, &[1, 4]);
    assert_eq!(contents(&bpm), vec![3, 4, 2]);
}

/// LRU evicts the page unpinned longest ago.
#[test]
fn test_lru_order() {
    let (bpm, _dir) = create_bpm(3, ReplacementStrategy::Lru);

    touch(&bpm, &[0, 1, 2]);
    touch(&bpm, &[3]);
    assert_eq!(contents(&bpm), vec![3, 1, 2]);

    // Page 1 used again: page 2 is now the oldest
    touch(&bpm, &[1, 4]);
    assert_eq!(contents(&bpm), vec![3, 1, 4]);
}

/// LRU recency is taken when the last pin is released, not when pinned.
#[test]
fn test_lru_uses_unpin_time() {
    let (bpm, _dir) = create_bpm(3, ReplacementStrategy::Lru);

    let h0 = bpm.pin_page(PageId::new(0)).unwrap();
    let h1 = bpm.pin_page(PageId::new(1)).unwrap();
    let h2 = bpm.pin_page(PageId::new(2)).unwrap();
    bpm.unpin_page(&h2).unwrap();
    bpm.unpin_page(&h0).unwrap();
    bpm.unpin_page(&h1).unwrap();

    touch(&bpm, &[3]);
    assert_eq!(contents(&bpm), vec![0, 1, 3]);
}

/// CLOCK: every bit is set after the first loads, so one sweep clears them
/// and the hand comes back to the first frame.
#[test]
fn test_clock_two_frames() {
    let (bpm, _dir) = create_bpm(2, ReplacementStrategy::Clock);

    touch(&bpm, &[0, 1, 2]);
    assert_eq!(contents(&bpm), vec![2, 1]);
}

/// CLOCK gives a re-used page a second chance where FIFO does not.
#[test]
fn test_clock_second_chance_vs_fifo() {
    let (clock, _d1) = create_bpm(3, ReplacementStrategy::Clock);
    let (fifo, _d2) = create_bpm(3, ReplacementStrategy::Fifo);

    for bpm in [&clock, &fifo] {
        touch(bpm, &[0, 1, 2, 3]);
        assert_eq!(contents(bpm), vec![3, 1, 2]);
        touch(bpm, &[1, 4]);
    }

    assert_eq!(contents(&clock), vec![3, 1, 4]);
    assert_eq!(contents(&fifo), vec![3, 4, 2]);
}

/// CLOCK passes over a pinned frame however many times the hand comes round.
#[test]
fn test_clock_skips_pinned() {
    let (bpm, _dir) = create_bpm(3, ReplacementStrategy::Clock);
    touch(&bpm, &[0, 1, 2]);

    let held = bpm.pin_page(PageId::new(0)).unwrap();
    touch(&bpm, &[3]);
    assert_eq!(contents(&bpm), vec![0, 3, 2]);
    touch(&bpm, &[4]);
    assert_eq!(contents(&bpm), vec![0, 3, 4]);
    bpm.unpin_page(&held).unwrap();
}

// ============================================================================
// Flush and shutdown
// ============================================================================

/// A pool-wide flush writes unpinned dirty pages only.
#[test]
fn test_flush_skips_pinned_dirty_pages() {
    let (bpm, _dir) = create_bpm(3, ReplacementStrategy::Lru);

    let pinned = bpm.pin_page(PageId::new(0)).unwrap();
    pinned.write().as_mut_slice()[0] = 1;
    bpm.mark_dirty(&pinned).unwrap();

    let released = bpm.pin_page(PageId::new(1)).unwrap();
    released.write().as_mut_slice()[0] = 2;
    bpm.mark_dirty(&released).unwrap();
    bpm.unpin_page(&released).unwrap();

    bpm.force_flush_pool().unwrap();
    assert_eq!(bpm.num_write_io(), 1);
    assert_eq!(bpm.dirty_flags(), vec![true, false, false]);

    // Nothing left to flush while page 0 stays pinned
    bpm.force_flush_pool().unwrap();
    assert_eq!(bpm.num_write_io(), 1);

    bpm.unpin_page(&pinned).unwrap();
    bpm.force_flush_pool().unwrap();
    assert_eq!(bpm.num_write_io(), 2);
    assert_eq!(bpm.dirty_flags(), vec![false; 3]);
}

/// Shutdown with an outstanding pin fails and leaves the pool usable.
#[test]
fn test_shutdown_with_pinned_page() {
    let (bpm, _dir) = create_bpm(3, ReplacementStrategy::Fifo);

    let handle = bpm.pin_page(PageId::new(0)).unwrap();
    handle.write().as_mut_slice()[0] = 0xAA;
    bpm.mark_dirty(&handle).unwrap();

    assert!(matches!(bpm.shutdown(), Err(Error::HavePinnedPage(p)) if p == PageId::new(0)));
    assert!(bpm.is_open());
    assert_eq!(bpm.fix_counts(), vec![1, 0, 0]);
    assert_eq!(bpm.dirty_flags(), vec![true, false, false]);

    // Still fully usable
    touch(&bpm, &[1]);
    assert_eq!(contents(&bpm)[..2], [0, 1]);

    bpm.unpin_page(&handle).unwrap();
    bpm.shutdown().unwrap();
    assert!(!bpm.is_open());
    assert_eq!(bpm.num_write_io(), 1);
}

/// Shutdown writes back dirty pages before closing the file.
#[test]
fn test_shutdown_flushes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.bin");
    PageFile::create(&path).unwrap().close().unwrap();

    let bpm = BufferPoolManager::open(&path, 2, ReplacementStrategy::Clock).unwrap();
    for p in 0..2 {
        let handle = bpm.pin_page(PageId::new(p)).unwrap();
        copy_string(handle.write().as_mut_slice(), &format!("page{}", p));
        bpm.mark_dirty(&handle).unwrap();
        bpm.unpin_page(&handle).unwrap();
    }
    bpm.shutdown().unwrap();
    assert_eq!(bpm.num_write_io(), 2);

    let mut page_file = PageFile::open(&path).unwrap();
    let mut page = pagepool::Page::new();
    page_file.read_page(PageId::new(1), &mut page).unwrap();
    assert_eq!(read_string(page.as_slice()), "page1");
}

/// Statistics reflect exactly one read per miss and one write per flush.
#[test]
fn test_io_counters() {
    let (bpm, _dir) = create_bpm(2, ReplacementStrategy::Lru);

    touch(&bpm, &[0, 1, 0, 1, 2]);
    assert_eq!(bpm.num_read_io(), 3);
    assert_eq!(bpm.num_write_io(), 0);

    let handle = bpm.pin_page(PageId::new(2)).unwrap();
    bpm.mark_dirty(&handle).unwrap();
    bpm.unpin_page(&handle).unwrap();

    // Evicts page 1 (clean), then page 2 (dirty)
    touch(&bpm, &[3, 4]);
    assert_eq!(bpm.num_read_io(), 5);
    assert_eq!(bpm.num_write_io(), 1);

    let snapshot = bpm.stats().snapshot();
    assert_eq!(snapshot.cache_hits, 3);
    assert_eq!(snapshot.cache_misses, 5);
    assert_eq!(snapshot.evictions, 3);
}

// ============================================================================
// Empty frames and failed loads
// ============================================================================

/// A discarded page's frame is reused before any cached page is evicted.
#[test]
fn test_discarded_frame_reused_first() {
    for strategy in ReplacementStrategy::ALL {
        let (bpm, _dir) = create_bpm(3, strategy);
        touch(&bpm, &[0, 1, 2, 3]);
        assert_eq!(contents(&bpm), vec![3, 1, 2], "{}", strategy);

        for p in [1, 2] {
            let handle = bpm.pin_page(PageId::new(p)).unwrap();
            bpm.mark_dirty(&handle).unwrap();
            bpm.unpin_page(&handle).unwrap();
        }
        // Page 3 is the most recently used when it is dropped
        touch(&bpm, &[3]);

        bpm.discard_page(PageId::new(3)).unwrap();
        touch(&bpm, &[4]);

        assert_eq!(contents(&bpm), vec![4, 1, 2], "{}", strategy);
        assert_eq!(bpm.stats().snapshot().evictions, 1);
        assert_eq!(bpm.num_write_io(), 0);
    }
}

/// A read that fails after the victim was written back returns the error
/// unchanged, leaves the victim frame empty, and the pool keeps working.
#[test]
fn test_failed_load_leaves_pool_consistent() {
    for strategy in ReplacementStrategy::ALL {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        let mut page_file = PageFile::create(&path).unwrap();
        page_file.ensure_capacity(4).unwrap();
        page_file.close().unwrap();

        let bpm = BufferPoolManager::open(&path, 2, strategy).unwrap();
        let handle = bpm.pin_page(PageId::new(0)).unwrap();
        handle.write().as_mut_slice()[0] = 7;
        bpm.mark_dirty(&handle).unwrap();
        bpm.unpin_page(&handle).unwrap();
        touch(&bpm, &[1]);

        // Cut page 3 short behind the pool's back
        OpenOptions::new()
            .write(true)
            .open(&path)
            .unwrap()
            .set_len((3 * PAGE_SIZE + 10) as u64)
            .unwrap();

        let result = bpm.pin_page(PageId::new(3));
        assert!(
            matches!(result, Err(Error::ReadFailed(p)) if p == PageId::new(3)),
            "{}",
            strategy
        );
        assert_eq!(
            bpm.frame_contents(),
            vec![PageId::INVALID, PageId::new(1)],
            "{}",
            strategy
        );
        assert_eq!(bpm.fix_counts(), vec![0, 0]);
        assert_eq!(bpm.dirty_flags(), vec![false, false]);
        assert_eq!(bpm.num_write_io(), 1);
        assert_eq!(bpm.page_count(), 1);

        // Page 0 was written back before the read failed, and it lands in
        // the emptied frame without evicting page 1
        let handle = bpm.pin_page(PageId::new(0)).unwrap();
        assert_eq!(handle.read().as_slice()[0], 7);
        assert_eq!(handle.frame_id().0, 0, "{}", strategy);
        bpm.unpin_page(&handle).unwrap();

        assert_eq!(contents(&bpm), vec![0, 1]);
        assert_eq!(bpm.stats().snapshot().evictions, 1);
        bpm.shutdown().unwrap();
    }
}
