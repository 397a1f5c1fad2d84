//! pagepool - a fixed-capacity page cache over a page-addressable file.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            pagepool                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Buffer Pool (buffer/)                     │   │
//! │  │   ┌─────────────────────────────────────────────────┐   │   │
//! │  │   │   Replacement: FIFO | LRU | CLOCK (per pool)     │   │   │
//! │  │   └─────────────────────────────────────────────────┘   │   │
//! │  │   BufferPoolManager + PageTable + Frame + Statistics    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Page Store (storage/)                     │   │
//! │  │                   PageFile + Page                        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, Error, config)
//! - [`buffer`] - Buffer pool management and eviction policies
//! - [`storage`] - Page file I/O and the page buffer
//!
//! # Quick Start
//! ```no_run
//! use pagepool::{BufferPoolManager, PageFile, PageId, ReplacementStrategy};
//!
//! PageFile::create("my_pages.bin")?.close()?;
//! let bpm = BufferPoolManager::open("my_pages.bin", 8, ReplacementStrategy::Clock)?;
//!
//! let handle = bpm.pin_page(PageId::new(3))?;
//! handle.write().as_mut_slice()[..5].copy_from_slice(b"hello");
//! bpm.mark_dirty(&handle)?;
//! bpm.unpin_page(&handle)?;
//!
//! bpm.shutdown()?;
//! # Ok::<(), pagepool::Error>(())
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{BufferPoolConfig, Error, FrameId, PageId, ReplacementStrategy, Result};

pub use buffer::{BufferPoolManager, BufferPoolStats, PageHandle, StatsSnapshot};
pub use storage::page::Page;
pub use storage::PageFile;
