//! Page File - page-addressable file I/O.
//!
//! The [`PageFile`] is the page store underneath the buffer pool:
//! - Creating, opening, closing and destroying page files
//! - Reading and writing whole pages by absolute page number
//! - Growing a file to a minimum page count
//!
//! Each `PageFile` is an ordinary owned value. There is no process-wide
//! registry of open files; whoever holds the value holds the file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{trace, warn};

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;

/// An open page file.
///
/// # File Layout
/// Pages are laid out back to back with no file header:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096    ...    N×4096
/// ```
///
/// # Thread Safety
/// `PageFile` is **single-threaded**. The `BufferPoolManager` serializes
/// access to it under the pool lock.
///
/// # Durability
/// Writes go to the OS with no `fsync`; [`PageFile::close`] syncs once.
#[derive(Debug)]
pub struct PageFile {
    file: File,
    path: PathBuf,
    /// Number of pages in the file.
    page_count: u32,
    /// Page most recently read; the anchor for relative reads.
    cur_page: u32,
}

impl PageFile {
    /// Create a new page file holding exactly one zero-filled page.
    ///
    /// # Errors
    /// `Error::FileAlreadyExists` if something already lives at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => Error::FileAlreadyExists(path.to_path_buf()),
                _ => Error::Io(e),
            })?;

        let mut page_file = Self {
            file,
            path: path.to_path_buf(),
            page_count: 0,
            cur_page: 0,
        };
        page_file.append_empty_page()?;

        trace!("created page file {}", path.display());
        Ok(page_file)
    }

    /// Open an existing page file.
    ///
    /// The page count is derived from the file size; a trailing partial
    /// page is ignored.
    ///
    /// # Errors
    /// `Error::FileNotFound` if the file doesn't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
                _ => Error::Io(e),
            })?;

        let file_size = file.metadata()?.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;

        trace!("opened page file {} with {} pages", path.display(), page_count);
        Ok(Self {
            file,
            path: path.to_path_buf(),
            page_count,
            cur_page: 0,
        })
    }

    /// Flush everything to disk and release the file.
    pub fn close(self) -> Result<()> {
        self.file.sync_all()?;
        trace!("closed page file {}", self.path.display());
        Ok(())
    }

    /// Remove a page file from the file system.
    ///
    /// # Errors
    /// `Error::FileNotFound` if there is nothing to remove.
    pub fn destroy<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        fs::remove_file(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })
    }

    // ========================================================================
    // Absolute access
    // ========================================================================

    /// Read page `page_id` into `page`.
    ///
    /// # Errors
    /// - `Error::ReadNonExistingPage` if the page is past the end of the file
    /// - `Error::ReadFailed` if the file ends inside the page
    pub fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        if !page_id.is_valid() || page_id.0 >= self.page_count {
            return Err(Error::ReadNonExistingPage(page_id));
        }

        self.file.seek(SeekFrom::Start(page_id.file_offset()))?;
        self.file
            .read_exact(page.as_mut_slice())
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => Error::ReadFailed(page_id),
                _ => Error::Io(e),
            })?;

        self.cur_page = page_id.0;
        Ok(())
    }

    /// Write `page` at page `page_id`.
    ///
    /// Writing at or past the current page count extends the file so that
    /// `page_id` becomes its last page.
    ///
    /// # Errors
    /// - `Error::InvalidPageId` for the sentinel page id
    /// - `Error::WriteFailed` if the whole page could not be written, for
    ///   whatever reason (short write, disk full, ...). Only a failed seek
    ///   surfaces as `Error::Io`.
    pub fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id));
        }

        self.file.seek(SeekFrom::Start(page_id.file_offset()))?;
        self.file.write_all(page.as_slice()).map_err(|e| {
            warn!("write of {} to {} failed: {}", page_id, self.path.display(), e);
            Error::WriteFailed(page_id)
        })?;

        if page_id.0 >= self.page_count {
            self.page_count = page_id.required_pages();
        }
        Ok(())
    }

    /// Append one zero-filled page at the end of the file.
    pub fn append_empty_page(&mut self) -> Result<PageId> {
        let page_id = PageId::new(self.page_count);
        self.write_page(page_id, &Page::new())?;
        Ok(page_id)
    }

    /// Grow the file with zero pages until it holds at least `min_pages`.
    ///
    /// Does nothing if the file is already large enough.
    pub fn ensure_capacity(&mut self, min_pages: u32) -> Result<()> {
        if self.page_count >= min_pages {
            return Ok(());
        }

        trace!(
            "growing {} from {} to {} pages",
            self.path.display(),
            self.page_count,
            min_pages
        );
        let zeros = Page::new();
        while self.page_count < min_pages {
            self.write_page(PageId::new(self.page_count), &zeros)?;
        }
        Ok(())
    }

    // ========================================================================
    // Relative access (cursor = last page read)
    // ========================================================================

    /// Page number of the most recently read page.
    #[inline]
    pub fn position(&self) -> PageId {
        PageId::new(self.cur_page)
    }

    /// Read the first page.
    pub fn read_first(&mut self, page: &mut Page) -> Result<()> {
        self.read_page(PageId::new(0), page)
    }

    /// Read the page before the current position.
    pub fn read_previous(&mut self, page: &mut Page) -> Result<()> {
        let prev = self.cur_page.checked_sub(1).map_or(PageId::INVALID, PageId::new);
        self.read_page(prev, page)
    }

    /// Re-read the page at the current position.
    pub fn read_current(&mut self, page: &mut Page) -> Result<()> {
        self.read_page(PageId::new(self.cur_page), page)
    }

    /// Read the page after the current position.
    pub fn read_next(&mut self, page: &mut Page) -> Result<()> {
        let next = self.cur_page.checked_add(1).map_or(PageId::INVALID, PageId::new);
        self.read_page(next, page)
    }

    /// Read the last page.
    pub fn read_last(&mut self, page: &mut Page) -> Result<()> {
        let last = self.page_count.checked_sub(1).map_or(PageId::INVALID, PageId::new);
        self.read_page(last, page)
    }

    /// Write `page` at the current position.
    pub fn write_current(&mut self, page: &Page) -> Result<()> {
        self.write_page(PageId::new(self.cur_page), page)
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Get the number of pages in the file.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Path this file was opened from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
