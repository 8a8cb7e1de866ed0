//! Tabula Core - Data Model
//!
//! Core types for the tabula request-scoped table cache:
//! - Field values and partially-populated field maps
//! - Table definitions, field descriptors, and the process-wide registry
//! - Records with explicit staged/persisted state and unique-key derivation
//! - The error taxonomy shared across the workspace
//! - The concrete `user` table schema

pub mod error;
pub mod record;
pub mod schema;
pub mod user;
pub mod value;

pub use error::{
    CacheError, RecordError, SchemaError, StorageError, TabulaError, TabulaResult,
    ValidationError,
};
pub use record::{Record, RecordState, UniqueKey};
pub use schema::{lookup_table, register_table, FieldDef, FieldType, TableDef, TableSchema};
pub use user::User;
pub use value::{FieldMap, FieldValue};
