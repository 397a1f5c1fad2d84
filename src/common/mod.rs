//! Common types shared by the page store and the buffer pool.
//!
//! - Configuration constants and [`config::BufferPoolConfig`]
//! - Error types
//! - Identifiers (PageId, FrameId)

pub mod config;
pub mod error;
mod frame_id;
mod page_id;

pub use config::{BufferPoolConfig, ReplacementStrategy};
pub use error::{Error, Result};
pub use frame_id::FrameId;
pub use page_id::PageId;
