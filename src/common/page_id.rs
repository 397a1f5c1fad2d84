//! Page number type.

use std::fmt;

use crate::common::config::PAGE_SIZE;

/// Absolute page number within a page file.
///
/// Page numbers are non-negative by construction; the all-ones value is
/// reserved as the "no page" sentinel reported for empty frames.
///
/// # Example
/// ```
/// use pagepool::PageId;
///
/// let page_id = PageId::new(3);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.file_offset(), 3 * 4096);
/// assert!(!PageId::INVALID.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// "No page" sentinel.
    pub const INVALID: PageId = PageId(u32::MAX);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page ID is a real page (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Byte offset of this page in its file.
    #[inline]
    pub fn file_offset(&self) -> u64 {
        self.0 as u64 * PAGE_SIZE as u64
    }

    /// Number of pages a file needs so that this page exists.
    #[inline]
    pub fn required_pages(&self) -> u32 {
        self.0 + 1
    }
}

impl From<u32> for PageId {
    fn from(id: u32) -> Self {
        PageId(id)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Page({})", self.0)
        } else {
            write!(f, "Page(NONE)")
        }
    }
}
