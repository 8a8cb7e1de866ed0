//! In-memory reference backend.
//!
//! Rows live in a `RwLock`-guarded map keyed by unique key, one bucket per
//! table, with a per-table auto-increment counter. Deterministic iteration
//! order (by unique key) keeps `find_all` results stable for tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use tabula_core::{
    FieldMap, FieldValue, Record, StorageError, TabulaResult, TableDef, UniqueKey,
};

use crate::backend::{Filter, TableBackend};

#[derive(Debug, Default)]
struct TableRows {
    rows: BTreeMap<UniqueKey, FieldMap>,
    next_id: i64,
}

impl TableRows {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory CRUD backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<&'static str, TableRows>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physically stored rows for `table`.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(table)
            .map_or(0, |t| t.rows.len())
    }

    /// Raw stored field map for the row with `key`, if present. Test and
    /// diagnostics helper; goes around the accessor layers entirely.
    pub fn raw_row(&self, table: &str, key: &UniqueKey) -> Option<FieldMap> {
        self.tables
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(table)
            .and_then(|t| t.rows.get(key).cloned())
    }
}

fn matches(row: &FieldMap, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(field, value)| row.get(field) == Some(value))
}

#[async_trait]
impl TableBackend for MemoryBackend {
    async fn find_one(
        &self,
        def: &'static TableDef,
        filter: &Filter,
    ) -> TabulaResult<Option<Record>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        let Some(table) = tables.get(def.name()) else {
            return Ok(None);
        };
        Ok(table
            .rows
            .values()
            .find(|row| matches(row, filter))
            .map(|row| Record::from_row(def, row.clone())))
    }

    async fn find_all(
        &self,
        def: &'static TableDef,
        filter: &Filter,
    ) -> TabulaResult<Vec<Record>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        let Some(table) = tables.get(def.name()) else {
            return Ok(Vec::new());
        };
        Ok(table
            .rows
            .values()
            .filter(|row| matches(row, filter))
            .map(|row| Record::from_row(def, row.clone()))
            .collect())
    }

    async fn save(&self, record: &mut Record) -> TabulaResult<()> {
        let def = record.definition();
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let table = tables.entry(def.name()).or_default();

        // Assign generated keys before deriving the row's identity.
        let generated: Vec<&'static str> = def
            .fields()
            .filter(|(name, field_def)| {
                field_def.auto_increment && record.get(name).is_none()
            })
            .map(|(name, _)| name)
            .collect();
        for name in generated {
            let id = table.next_id();
            record
                .set(name, FieldValue::BigInt(id))
                .map_err(|e| StorageError::Backend {
                    reason: e.to_string(),
                })?;
        }

        let key = record.unique_key().map_err(|e| StorageError::Backend {
            reason: e.to_string(),
        })?;
        table.rows.insert(key, record.fields().clone());
        record.mark_persisted();
        Ok(())
    }

    async fn destroy(&self, record: &Record) -> TabulaResult<()> {
        let key = record.unique_key().map_err(|e| StorageError::Backend {
            reason: e.to_string(),
        })?;
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        if let Some(table) = tables.get_mut(record.table()) {
            table.rows.remove(&key);
        }
        Ok(())
    }

    async fn materialize(&self, def: &'static TableDef) -> TabulaResult<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        tables.insert(def.name(), TableRows::default());
        Ok(())
    }
}
