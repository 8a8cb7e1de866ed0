//! Shared test support: a call-counting, failure-injecting backend wrapper
//! and a second table schema for multi-table scenarios.
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};

use tabula_core::{
    FieldDef, FieldMap, Record, StorageError, TabulaResult, TableDef, TableSchema,
};
use tabula_storage::{Filter, MemoryBackend, TableBackend};

/// Wraps [`MemoryBackend`], counting calls per operation and optionally
/// failing `destroy` for one unique key.
#[derive(Default)]
pub struct CountingBackend {
    pub inner: MemoryBackend,
    pub find_one_calls: AtomicUsize,
    pub find_all_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
    pub destroy_calls: AtomicUsize,
    fail_destroy_key: Option<String>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `destroy` fails for the row with unique key `key`.
    pub fn failing_destroy(key: &str) -> Self {
        Self {
            fail_destroy_key: Some(key.to_string()),
            ..Self::default()
        }
    }

    pub fn find_one_count(&self) -> usize {
        self.find_one_calls.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn destroy_count(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TableBackend for CountingBackend {
    async fn find_one(
        &self,
        def: &'static TableDef,
        filter: &Filter,
    ) -> TabulaResult<Option<Record>> {
        self.find_one_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_one(def, filter).await
    }

    async fn find_all(
        &self,
        def: &'static TableDef,
        filter: &Filter,
    ) -> TabulaResult<Vec<Record>> {
        self.find_all_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_all(def, filter).await
    }

    async fn save(&self, record: &mut Record) -> TabulaResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.save(record).await
    }

    async fn destroy(&self, record: &Record) -> TabulaResult<()> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(fail_key) = &self.fail_destroy_key {
            if record.unique_key().map(|k| k.as_str() == fail_key.as_str()) == Ok(true) {
                return Err(StorageError::Backend {
                    reason: "injected destroy failure".to_string(),
                }
                .into());
            }
        }
        self.inner.destroy(record).await
    }

    async fn materialize(&self, def: &'static TableDef) -> TabulaResult<()> {
        self.inner.materialize(def).await
    }
}

/// Second table for multi-table sync scenarios.
pub struct Item;

static ITEM_DEF: Lazy<TableDef> = Lazy::new(|| {
    TableDef::new(
        Item::TABLE,
        vec![
            ("id", FieldDef::big_int().primary_key()),
            ("label", FieldDef::text(20).not_null()),
        ],
    )
    .expect("item table definition is valid")
});

impl TableSchema for Item {
    const TABLE: &'static str = "item";

    fn definition() -> &'static TableDef {
        &ITEM_DEF
    }
}

/// Build a field map for a user row.
pub fn user_fields(id: i64, name: &str) -> FieldMap {
    tabula_core::fields! { "id" => id, "name" => name }
}
