//! Generic CRUD accessor over one logical table.
//!
//! `Table<S>` is the uncached Record Accessor: schema-aware get/find/create
//! plus save and destroy passed straight through to the backend. The
//! write-behind layer in [`crate::cache`] builds on it.

use std::marker::PhantomData;
use std::sync::Arc;

use tabula_core::{
    FieldMap, Record, RecordError, TabulaResult, TableDef, TableSchema, UniqueKey,
};

use crate::backend::{Filter, TableBackend};

/// CRUD façade for the table described by `S`.
pub struct Table<S: TableSchema> {
    backend: Arc<dyn TableBackend>,
    _schema: PhantomData<fn() -> S>,
}

impl<S: TableSchema> Table<S> {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self {
            backend,
            _schema: PhantomData,
        }
    }

    /// The backend this accessor persists through.
    pub fn backend(&self) -> &Arc<dyn TableBackend> {
        &self.backend
    }

    /// This table's definition.
    pub fn definition(&self) -> &'static TableDef {
        S::definition()
    }

    /// Find one record by primary key.
    ///
    /// The filter is restricted to primary-key fields; any non-key fields
    /// in `key_fields` are ignored. Fails with `MissingKey` when a
    /// primary-key field is absent from the input.
    pub async fn get(&self, key_fields: &FieldMap) -> TabulaResult<Option<Record>> {
        let def = S::definition();
        let mut filter = Filter::new();
        for key in def.primary_keys() {
            let value = key_fields
                .get(key)
                .ok_or_else(|| RecordError::MissingKey {
                    table: def.name().to_string(),
                    field: key.to_string(),
                })?;
            filter.insert(key.to_string(), value.clone());
        }
        self.backend.find_one(def, &filter).await
    }

    /// Find every record matching `filter`, passed through verbatim.
    pub async fn find(&self, filter: &Filter) -> TabulaResult<Vec<Record>> {
        self.backend.find_all(S::definition(), filter).await
    }

    /// Find at most one record matching `filter`.
    pub async fn find_one(&self, filter: &Filter) -> TabulaResult<Option<Record>> {
        self.backend.find_one(S::definition(), filter).await
    }

    /// Build a new unsaved record. No backing-store round trip.
    pub fn create(&self, fields: FieldMap) -> Record {
        self.backend.build(S::definition(), fields)
    }

    /// Persist `record` (insert or update, decided by the backend).
    pub async fn save(&self, record: &mut Record) -> TabulaResult<()> {
        self.backend.save(record).await
    }

    /// Delete `record`'s row.
    pub async fn destroy(&self, record: &Record) -> TabulaResult<()> {
        self.backend.destroy(record).await
    }

    /// Drop and recreate the table. Environment setup only.
    pub async fn migrate(&self) -> TabulaResult<()> {
        self.backend.materialize(S::definition()).await
    }

    /// Derive the unique key for `fields` under this table's definition.
    pub fn unique_key(&self, fields: &FieldMap) -> Result<UniqueKey, RecordError> {
        UniqueKey::from_fields(S::definition(), fields)
    }
}

impl<S: TableSchema> Clone for Table<S> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            _schema: PhantomData,
        }
    }
}
