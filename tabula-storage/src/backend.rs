//! The backing-store contract.
//!
//! The cache layers treat persistence as an opaque CRUD backend. Anything
//! that can find, save, and destroy rows for a table definition can sit
//! underneath the accessors; the workspace ships [`crate::MemoryBackend`]
//! as the reference implementation.

use async_trait::async_trait;

use tabula_core::{FieldMap, Record, TabulaResult, TableDef};

/// Equality conditions on field values.
pub type Filter = FieldMap;

/// Opaque CRUD backend for one or more logical tables.
///
/// Implementations decide insert-vs-update in `save` from the presence of
/// the generated key, and assign auto-increment key values on insert.
#[async_trait]
pub trait TableBackend: Send + Sync {
    /// Find at most one row matching `filter`.
    async fn find_one(
        &self,
        def: &'static TableDef,
        filter: &Filter,
    ) -> TabulaResult<Option<Record>>;

    /// Find every row matching `filter`.
    async fn find_all(
        &self,
        def: &'static TableDef,
        filter: &Filter,
    ) -> TabulaResult<Vec<Record>>;

    /// Build an unsaved record. No round trip; schema defaults are applied.
    fn build(&self, def: &'static TableDef, fields: FieldMap) -> Record {
        Record::build(def, fields)
    }

    /// Persist `record`, assigning generated key values as needed and
    /// marking it persisted.
    async fn save(&self, record: &mut Record) -> TabulaResult<()>;

    /// Delete `record`'s row. Deleting an absent row is not an error.
    async fn destroy(&self, record: &Record) -> TabulaResult<()>;

    /// Drop and recreate the table from its definition. Destructive;
    /// environment setup only.
    async fn materialize(&self, def: &'static TableDef) -> TabulaResult<()>;
}
