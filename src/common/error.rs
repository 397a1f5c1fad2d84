//! Error types for pagepool.

use std::path::PathBuf;

use thiserror::Error;

use crate::common::PageId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors returned by the page store and the buffer pool.
///
/// Page store failures are surfaced to buffer pool callers unchanged;
/// nothing in this crate retries an operation on its own.
#[derive(Debug, Error)]
pub enum Error {
    /// The page file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// `create` was asked to make a page file that already exists.
    #[error("File already exists: {}", .0.display())]
    FileAlreadyExists(PathBuf),

    /// Fewer than a full page of bytes reached the file.
    #[error("Write of {0} failed")]
    WriteFailed(PageId),

    /// Fewer than a full page of bytes could be read back.
    #[error("Read of {0} failed")]
    ReadFailed(PageId),

    /// The page lies outside the current extent of the page file.
    #[error("Trying to read non-existing {0}")]
    ReadNonExistingPage(PageId),

    /// Every frame is pinned; no victim could be chosen.
    #[error("Buffer pool is full")]
    BufferPoolFull,

    /// The page is not resident, or its fix count is already zero.
    #[error("{0} is not pinned")]
    PageNotPinned(PageId),

    /// Shutdown was refused because a frame still has outstanding pins.
    #[error("Cannot shut down, {0} is pinned")]
    HavePinnedPage(PageId),

    /// The frame holding the page is pinned and cannot be repurposed.
    #[error("Frame holding {0} is in use")]
    FrameInUse(PageId),

    /// The pool has been shut down.
    #[error("Buffer pool is not initialized")]
    NotInitialized,

    /// The sentinel page id was passed where a real page is required.
    #[error("Invalid page ID: {0}")]
    InvalidPageId(PageId),

    /// A replacement strategy that is declared but not implemented.
    #[error("Unsupported replacement strategy: {0}")]
    UnsupportedStrategy(String),

    /// Configuration rejected at pool initialization.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Any other I/O error from the page file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
