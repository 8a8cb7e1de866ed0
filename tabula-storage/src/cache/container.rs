//! Cache container bookkeeping.
//!
//! The container is the request's entire cache state: per table, three maps
//! from unique key to record — one per operation type. SELECT entries are
//! confirmed reads; UPDATE and DELETE entries are pending writes flushed at
//! sync. A key is never under UPDATE and DELETE at once for one table; the
//! write-behind layer maintains that exclusion.

use std::collections::HashMap;

use tabula_core::{Record, UniqueKey};

/// Cache operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOp {
    /// Confirmed, unmodified read.
    Select,
    /// Pending write, persisted at sync.
    Update,
    /// Pending removal, persisted at sync.
    Delete,
}

/// Per-table cache state.
#[derive(Debug, Default)]
pub struct TableCache {
    select: HashMap<UniqueKey, Record>,
    update: HashMap<UniqueKey, Record>,
    delete: HashMap<UniqueKey, Record>,
}

impl TableCache {
    fn map(&self, op: CacheOp) -> &HashMap<UniqueKey, Record> {
        match op {
            CacheOp::Select => &self.select,
            CacheOp::Update => &self.update,
            CacheOp::Delete => &self.delete,
        }
    }

    fn map_mut(&mut self, op: CacheOp) -> &mut HashMap<UniqueKey, Record> {
        match op {
            CacheOp::Select => &mut self.select,
            CacheOp::Update => &mut self.update,
            CacheOp::Delete => &mut self.delete,
        }
    }

    pub fn get(&self, op: CacheOp, key: &UniqueKey) -> Option<&Record> {
        self.map(op).get(key)
    }

    pub fn contains(&self, op: CacheOp, key: &UniqueKey) -> bool {
        self.map(op).contains_key(key)
    }

    pub fn insert(&mut self, op: CacheOp, key: UniqueKey, record: Record) {
        self.map_mut(op).insert(key, record);
    }

    pub fn remove(&mut self, op: CacheOp, key: &UniqueKey) -> Option<Record> {
        self.map_mut(op).remove(key)
    }

    pub fn len(&self, op: CacheOp) -> usize {
        self.map(op).len()
    }

    pub fn is_empty(&self) -> bool {
        self.select.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    fn clear(&mut self) {
        self.select.clear();
        self.update.clear();
        self.delete.clear();
    }
}

/// A pending persistence operation drained out of the container at sync.
#[derive(Debug)]
pub enum PendingWrite {
    /// One `save` per UPDATE-cached record.
    Save(Record),
    /// One `destroy` per DELETE-cached record.
    Destroy(Record),
}

/// Request-scoped cache state: table identifier to per-table cache.
#[derive(Debug, Default)]
pub struct CacheContainer {
    tables: HashMap<&'static str, TableCache>,
}

impl CacheContainer {
    /// Cache state for `table`, if any entries exist.
    pub fn table(&self, table: &str) -> Option<&TableCache> {
        self.tables.get(table)
    }

    /// Cache state for `table`, created on first use.
    pub fn table_mut(&mut self, table: &'static str) -> &mut TableCache {
        self.tables.entry(table).or_default()
    }

    /// Cached record for (`table`, `op`, `key`).
    pub fn get(&self, table: &str, op: CacheOp, key: &UniqueKey) -> Option<&Record> {
        self.tables.get(table).and_then(|t| t.get(op, key))
    }

    /// Discard all state for `table` without touching the backing store.
    pub fn clear_table(&mut self, table: &str) {
        if let Some(cache) = self.tables.get_mut(table) {
            cache.clear();
        }
    }

    /// Discard all state for every table.
    pub fn clear_all(&mut self) {
        for cache in self.tables.values_mut() {
            cache.clear();
        }
    }

    /// Empty the targeted tables (all three maps) and return their pending
    /// writes: one [`PendingWrite::Save`] per UPDATE record, one
    /// [`PendingWrite::Destroy`] per DELETE record.
    ///
    /// Clearing happens here, before the caller awaits anything, so
    /// re-entrant cache reads during a flush never observe stale pending
    /// state.
    pub fn drain_pending(&mut self, table: Option<&str>) -> Vec<PendingWrite> {
        let mut pending = Vec::new();
        for (name, cache) in &mut self.tables {
            if let Some(only) = table {
                if *name != only {
                    continue;
                }
            }
            cache.select.clear();
            pending.extend(cache.update.drain().map(|(_, r)| PendingWrite::Save(r)));
            pending.extend(cache.delete.drain().map(|(_, r)| PendingWrite::Destroy(r)));
        }
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::{fields, Record, TableSchema, User};

    fn record(id: i64, name: &str) -> (UniqueKey, Record) {
        let record = Record::build(
            User::definition(),
            fields! { "id" => id, "name" => name },
        );
        (record.unique_key().expect("id present"), record)
    }

    #[test]
    fn test_ops_are_independent_maps() {
        let mut container = CacheContainer::default();
        let (key, rec) = record(1, "a");
        let cache = container.table_mut("user");
        cache.insert(CacheOp::Select, key.clone(), rec.clone());
        cache.insert(CacheOp::Update, key.clone(), rec);
        assert!(cache.contains(CacheOp::Select, &key));
        assert!(cache.contains(CacheOp::Update, &key));
        assert!(!cache.contains(CacheOp::Delete, &key));
        cache.remove(CacheOp::Update, &key);
        assert!(cache.contains(CacheOp::Select, &key));
    }

    #[test]
    fn test_drain_pending_scoped_to_one_table() {
        let mut container = CacheContainer::default();
        let (key_a, rec_a) = record(1, "a");
        let (key_b, rec_b) = record(2, "b");
        container
            .table_mut("user")
            .insert(CacheOp::Update, key_a, rec_a);
        container
            .table_mut("other")
            .insert(CacheOp::Delete, key_b, rec_b);

        let pending = container.drain_pending(Some("user"));
        assert_eq!(pending.len(), 1);
        assert!(matches!(pending[0], PendingWrite::Save(_)));
        // The other table's pending delete is untouched.
        assert_eq!(
            container.table("other").map(|t| t.len(CacheOp::Delete)),
            Some(1)
        );
    }

    #[test]
    fn test_drain_pending_clears_select_too() {
        let mut container = CacheContainer::default();
        let (key, rec) = record(1, "a");
        let cache = container.table_mut("user");
        cache.insert(CacheOp::Select, key.clone(), rec.clone());
        cache.insert(CacheOp::Delete, key, rec);

        let pending = container.drain_pending(None);
        assert_eq!(pending.len(), 1);
        assert!(matches!(pending[0], PendingWrite::Destroy(_)));
        assert!(container.table("user").map_or(true, TableCache::is_empty));
    }
}
