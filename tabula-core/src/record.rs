//! Records and unique-key derivation.
//!
//! A `Record` is an instance bound to a table definition: a field map plus
//! an explicit staged/persisted state. Records are plain values — cloning
//! one never aliases cache-internal state, so a caller mutating a returned
//! record cannot corrupt the cache behind its back.

use std::fmt;

use crate::error::{RecordError, SchemaError};
use crate::schema::TableDef;
use crate::value::{FieldMap, FieldValue};

/// Whether a record has ever been persisted by the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Built in memory, not yet saved.
    New,
    /// Fetched from, or saved to, the backing store.
    Persisted,
}

/// A record's unique key: its primary-key values in declaration order,
/// joined with `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniqueKey(String);

impl UniqueKey {
    /// Derive the unique key for `fields` under `def`.
    ///
    /// Fails with [`RecordError::MissingKey`] when any primary-key field is
    /// absent: a record whose generated key has not been assigned yet has
    /// no identity to cache under.
    pub fn from_fields(def: &TableDef, fields: &FieldMap) -> Result<Self, RecordError> {
        let mut segments = Vec::new();
        for key in def.primary_keys() {
            let value = fields.get(key).ok_or_else(|| RecordError::MissingKey {
                table: def.name().to_string(),
                field: key.to_string(),
            })?;
            segments.push(value.to_string());
        }
        Ok(Self(segments.join(":")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An instance of one logical table row.
#[derive(Debug, Clone)]
pub struct Record {
    def: &'static TableDef,
    fields: FieldMap,
    state: RecordState,
}

impl Record {
    /// Build a new, unsaved record.
    ///
    /// Fields not declared in the schema are dropped; declared fields that
    /// are absent from the input receive their schema default, if any. No
    /// backing-store round trip happens here.
    pub fn build(def: &'static TableDef, fields: FieldMap) -> Self {
        let mut populated = FieldMap::new();
        for (name, field_def) in def.fields() {
            match fields.get(name) {
                Some(value) => {
                    populated.insert(name.to_string(), value.clone());
                }
                None => {
                    if let Some(default) = &field_def.default {
                        populated.insert(name.to_string(), default.clone());
                    }
                }
            }
        }
        Self {
            def,
            fields: populated,
            state: RecordState::New,
        }
    }

    /// Rehydrate a record from a stored row. Used by backends; no defaults
    /// are applied.
    pub fn from_row(def: &'static TableDef, fields: FieldMap) -> Self {
        Self {
            def,
            fields,
            state: RecordState::Persisted,
        }
    }

    /// The definition this record is bound to.
    pub fn definition(&self) -> &'static TableDef {
        self.def
    }

    /// Table identifier.
    pub fn table(&self) -> &'static str {
        self.def.name()
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    pub fn is_persisted(&self) -> bool {
        self.state == RecordState::Persisted
    }

    /// Flip the record to persisted. Called by backends after a save.
    pub fn mark_persisted(&mut self) {
        self.state = RecordState::Persisted;
    }

    /// Value of `field`, or `None` when undefined.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Set a declared field's value.
    pub fn set(
        &mut self,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), SchemaError> {
        if self.def.field(field).is_none() {
            return Err(SchemaError::UnknownField {
                table: self.def.name().to_string(),
                field: field.to_string(),
            });
        }
        self.fields.insert(field.to_string(), value.into());
        Ok(())
    }

    /// Clear a field back to undefined.
    pub fn unset(&mut self, field: &str) {
        self.fields.remove(field);
    }

    /// The full field map.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// This record's unique key. See [`UniqueKey::from_fields`].
    pub fn unique_key(&self) -> Result<UniqueKey, RecordError> {
        UniqueKey::from_fields(self.def, &self.fields)
    }

    /// Overwrite every declared field with `other`'s value.
    ///
    /// Full overwrite, not a patch: fields undefined on `other` become
    /// undefined here too. The persisted state is kept, so a resurrected
    /// record still saves as an update rather than an insert.
    pub fn merge_from(&mut self, other: &Record) {
        for (name, _) in self.def.fields() {
            match other.fields.get(name) {
                Some(value) => {
                    self.fields.insert(name.to_string(), value.clone());
                }
                None => {
                    self.fields.remove(name);
                }
            }
        }
    }
}

/// Records compare by table identity and field values; the staged/persisted
/// state is bookkeeping, not identity.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.def.name() == other.def.name() && self.fields == other.fields
    }
}

impl Eq for Record {}
