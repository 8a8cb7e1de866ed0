//! Tabula Storage - Backends and the Write-Behind Cache
//!
//! Storage abstraction for tabula tables:
//! - The backing-store contract ([`TableBackend`]) and the in-memory
//!   reference backend ([`MemoryBackend`])
//! - The generic CRUD accessor ([`Table`])
//! - The request-scoped context ([`RequestContext`]) and the write-behind
//!   cached accessor ([`CachedTable`])

pub mod backend;
pub mod cache;
pub mod context;
pub mod memory;
pub mod table;

pub use backend::{Filter, TableBackend};
pub use cache::{CacheContainer, CacheOp, CachedTable, PendingWrite, TableCache};
pub use context::RequestContext;
pub use memory::MemoryBackend;
pub use table::Table;
