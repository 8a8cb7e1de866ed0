//! Request-scoped context.
//!
//! One `RequestContext` exists per request and exclusively owns that
//! request's cache container. The container sits in a typed slot rather
//! than a string-keyed property, and is created lazily on first use;
//! dropping the context discards all pending cache state.

use crate::cache::CacheContainer;

/// Mutable, request-scoped state threaded through the cached accessors.
///
/// Requests run concurrently but each owns a disjoint context, so the
/// exclusive `&mut` borrow is the only synchronization the cache needs.
#[derive(Debug, Default)]
pub struct RequestContext {
    cache: Option<CacheContainer>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache container, if one has been created for this request.
    pub fn cache(&self) -> Option<&CacheContainer> {
        self.cache.as_ref()
    }

    /// The cache container, created on first use.
    pub fn cache_mut(&mut self) -> &mut CacheContainer {
        self.cache.get_or_insert_with(CacheContainer::default)
    }

    /// Mutable access without lazily creating the container. Read-only
    /// paths and cache clearing use this to avoid allocating state for
    /// requests that never cached anything.
    pub fn existing_cache_mut(&mut self) -> Option<&mut CacheContainer> {
        self.cache.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_slot_is_lazy() {
        let mut ctx = RequestContext::new();
        assert!(ctx.cache().is_none());
        assert!(ctx.existing_cache_mut().is_none());
        ctx.cache_mut();
        assert!(ctx.cache().is_some());
    }
}
