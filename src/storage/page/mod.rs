//! In-memory page image.

#[allow(clippy::module_inception)]
mod page;

pub use page::Page;
