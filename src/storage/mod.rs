//! Storage layer - the page store under the buffer pool.
//!
//! - [`PageFile`] - Page-addressable file I/O
//! - [`page`] - The in-memory page image

pub mod page;
mod page_file;

pub use page_file::PageFile;
