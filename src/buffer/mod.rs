//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache between clients and the page
//! file. It manages a fixed pool of frames, each holding one page.
//!
//! # Components
//! - [`BufferPoolManager`] - The page cache and its pin protocol
//! - [`PageHandle`] - A pinned page as seen by clients
//! - [`Frame`] / [`FrameHeader`] - Frame buffer and its metadata
//! - [`PageTable`] - Resident page → frame lookup
//! - [`BufferPoolStats`] - I/O and cache counters
//! - [`replacer`] - Eviction policy implementations

mod buffer_pool_manager;
mod frame;
mod page_handle;
mod page_table;
pub mod replacer;
mod stats;

pub use buffer_pool_manager::BufferPoolManager;
pub use frame::{Frame, FrameHeader};
pub use page_handle::PageHandle;
pub use page_table::PageTable;
pub use stats::{BufferPoolStats, StatsSnapshot};
