//! Request-scoped write-behind cache.
//!
//! [`container`] holds the per-request cache state; [`write_behind`] is the
//! cached accessor that reads through and stages writes against it.

pub mod container;
pub mod write_behind;

pub use container::{CacheContainer, CacheOp, PendingWrite, TableCache};
pub use write_behind::CachedTable;
