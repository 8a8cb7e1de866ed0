//! Write-behind cached accessor.
//!
//! `CachedTable<S>` intercepts reads and writes for one table within one
//! request. Reads are served from the SELECT cache when possible; writes
//! are staged under UPDATE or DELETE and only reach the backing store at
//! [`CachedTable::sync`]. Three intents on the same key reconcile as:
//! DELETE shadows SELECT on reads, DELETE supersedes UPDATE when staged,
//! and forging over a staged DELETE resurrects the record.

use std::sync::Arc;

use futures_util::future::join_all;

use tabula_core::{
    CacheError, FieldMap, Record, TabulaResult, TableSchema, UniqueKey,
};

use crate::backend::{Filter, TableBackend};
use crate::cache::container::{CacheOp, PendingWrite};
use crate::context::RequestContext;
use crate::table::Table;

/// Cached Record Accessor for the table described by `S`.
pub struct CachedTable<S: TableSchema> {
    table: Table<S>,
}

impl<S: TableSchema> CachedTable<S> {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self {
            table: Table::new(backend),
        }
    }

    /// The uncached accessor underneath.
    pub fn base(&self) -> &Table<S> {
        &self.table
    }

    /// Find one record by primary key, cache first.
    ///
    /// A key staged for deletion reads as absent even while the row is
    /// still physically present. A SELECT-cached record is returned without
    /// a store round trip. Otherwise the base accessor is queried and a
    /// present result is registered under SELECT; absent results are never
    /// cached.
    pub async fn get(
        &self,
        key_fields: &FieldMap,
        ctx: &mut RequestContext,
    ) -> TabulaResult<Option<Record>> {
        let key = self.table.unique_key(key_fields)?;

        if let Some(cache) = ctx.cache() {
            if let Some(table_cache) = cache.table(S::TABLE) {
                if table_cache.contains(CacheOp::Delete, &key) {
                    return Ok(None);
                }
                if let Some(record) = table_cache.get(CacheOp::Select, &key) {
                    tracing::debug!(table = S::TABLE, key = %key, "select cache hit");
                    return Ok(Some(record.clone()));
                }
            }
        }

        let Some(record) = self.table.get(key_fields).await? else {
            return Ok(None);
        };
        ctx.cache_mut()
            .table_mut(S::TABLE)
            .insert(CacheOp::Select, key, record.clone());
        Ok(Some(record))
    }

    /// Find records by arbitrary equality conditions, reconciled with the
    /// cache.
    ///
    /// Always queries the store (the cache cannot answer non-key
    /// conditions). Per result row: keys staged for deletion are dropped;
    /// SELECT-cached instances replace the freshly fetched ones so any
    /// values already handed to the caller stay authoritative; remaining
    /// rows are registered under SELECT, which lets a later `get` hit cache
    /// for rows only ever seen through `filter`. Store order is preserved
    /// minus dropped entries.
    pub async fn filter(
        &self,
        conditions: &Filter,
        ctx: &mut RequestContext,
    ) -> TabulaResult<Vec<Record>> {
        let fetched = self.table.find(conditions).await?;
        let table_cache = ctx.cache_mut().table_mut(S::TABLE);

        let mut result = Vec::with_capacity(fetched.len());
        for record in fetched {
            let key = record.unique_key()?;
            if table_cache.contains(CacheOp::Delete, &key) {
                continue;
            }
            if let Some(cached) = table_cache.get(CacheOp::Select, &key) {
                result.push(cached.clone());
                continue;
            }
            table_cache.insert(CacheOp::Select, key, record.clone());
            result.push(record);
        }
        Ok(result)
    }

    /// Build a record and stage it for insertion, reconciling with pending
    /// state for its key.
    ///
    /// A key staged for deletion is resurrected: the new record's fields
    /// overwrite the staged one's (full schema-wide overwrite), the DELETE
    /// entry is dropped, and the merged record is re-staged as an update.
    /// A key already in the SELECT cache is a duplicate-key error. The
    /// input must contain every primary-key value; generated keys cannot be
    /// forged.
    pub async fn forge(
        &self,
        fields: FieldMap,
        ctx: &mut RequestContext,
    ) -> TabulaResult<Record> {
        let key = self.table.unique_key(&fields)?;
        let record = self.table.create(fields);

        let staged_delete = ctx
            .cache_mut()
            .table_mut(S::TABLE)
            .remove(CacheOp::Delete, &key);
        if let Some(mut resurrected) = staged_delete {
            tracing::debug!(table = S::TABLE, key = %key, "resurrecting deleted record");
            resurrected.merge_from(&record);
            self.store(&resurrected, ctx)?;
            return Ok(resurrected);
        }

        let select_hit = ctx
            .cache()
            .and_then(|c| c.table(S::TABLE))
            .map_or(false, |t| t.contains(CacheOp::Select, &key));
        if select_hit {
            return Err(CacheError::DuplicateKey {
                table: S::TABLE.to_string(),
                unique_key: key.to_string(),
            }
            .into());
        }

        self.store(&record, ctx)?;
        Ok(record)
    }

    /// Stage a pending write for `record`.
    ///
    /// Fails with `AlreadyDeleted` when the key is staged for deletion
    /// (re-forge to resurrect instead), and with a validation error when
    /// the record violates schema constraints. On success the record is
    /// registered under both SELECT and UPDATE: a staged update is also the
    /// current true read view for its key.
    pub fn store(&self, record: &Record, ctx: &mut RequestContext) -> TabulaResult<()> {
        let key = record.unique_key()?;
        let table_cache = ctx.cache_mut().table_mut(S::TABLE);

        if table_cache.contains(CacheOp::Delete, &key) {
            return Err(CacheError::AlreadyDeleted {
                table: S::TABLE.to_string(),
                unique_key: key.to_string(),
            }
            .into());
        }
        if let Some(violation) = S::validate(record) {
            return Err(violation.into());
        }

        table_cache.insert(CacheOp::Select, key.clone(), record.clone());
        table_cache.insert(CacheOp::Update, key, record.clone());
        Ok(())
    }

    /// Stage a pending delete for `record`.
    ///
    /// Delete intent supersedes update intent: any UPDATE entry for the
    /// key is evicted. The SELECT entry is deliberately left alone —
    /// `get` consults DELETE first, so the key already reads as absent.
    pub fn remove(&self, record: &Record, ctx: &mut RequestContext) -> TabulaResult<()> {
        let key = record.unique_key()?;
        let table_cache = ctx.cache_mut().table_mut(S::TABLE);
        table_cache.insert(CacheOp::Delete, key.clone(), record.clone());
        table_cache.remove(CacheOp::Update, &key);
        Ok(())
    }

    /// Flush pending writes to the backing store.
    ///
    /// Drains UPDATE and DELETE state for every table in the container (or
    /// only this accessor's table when `all_tables` is false) — clearing
    /// SELECT/UPDATE/DELETE maps *before* anything is awaited — then issues
    /// one `save` per drained update and one `destroy` per drained delete.
    /// All operations are created before any is awaited and run
    /// concurrently; a failure in one never prevents the others from being
    /// attempted. The first failure is surfaced after all have settled.
    ///
    /// Not transactional: a failed flush leaves the store partially
    /// updated and the cache already empty.
    pub async fn sync(&self, ctx: &mut RequestContext, all_tables: bool) -> TabulaResult<()> {
        let target = if all_tables { None } else { Some(S::TABLE) };
        let pending = match ctx.existing_cache_mut() {
            Some(cache) => cache.drain_pending(target),
            None => return Ok(()),
        };
        if pending.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            table = S::TABLE,
            all_tables,
            count = pending.len(),
            "flushing pending writes"
        );

        let flushes = pending.into_iter().map(|write| {
            let backend = Arc::clone(self.table.backend());
            async move {
                match write {
                    PendingWrite::Save(mut record) => backend.save(&mut record).await,
                    PendingWrite::Destroy(record) => backend.destroy(&record).await,
                }
            }
        });

        let mut first_error = None;
        for outcome in join_all(flushes).await {
            if let Err(error) = outcome {
                tracing::warn!(error = %error, "flush operation failed");
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Discard cached state for this table (or every table) without
    /// touching the backing store.
    pub fn clear_cache(&self, ctx: &mut RequestContext, all_tables: bool) {
        if let Some(cache) = ctx.existing_cache_mut() {
            if all_tables {
                cache.clear_all();
            } else {
                cache.clear_table(S::TABLE);
            }
        }
    }

    /// Cached record for (`op`, `key_fields`), if any. Diagnostics and
    /// test helper; does not touch the backing store or register reads.
    pub fn peek(
        &self,
        op: CacheOp,
        key: &UniqueKey,
        ctx: &RequestContext,
    ) -> Option<Record> {
        ctx.cache()
            .and_then(|c| c.get(S::TABLE, op, key))
            .cloned()
    }
}

impl<S: TableSchema> Clone for CachedTable<S> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}
