//! Frame slot index.

use std::fmt;

/// Index of a frame in the pool's fixed frame array.
///
/// Frames never move, so a `FrameId` stays a stable handle for the slot for
/// the lifetime of the pool. Replacers store these instead of pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

impl FrameId {
    /// Create a new FrameId.
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }

    /// The slot after this one, wrapping around a pool of `pool_size` frames.
    #[inline]
    pub fn next(self, pool_size: usize) -> Self {
        FrameId((self.0 + 1) % pool_size)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}
