//! Table definitions, field descriptors, and the process-wide registry.
//!
//! A `TableDef` is the ordered set of field descriptors for one logical
//! table. Concrete table types implement [`TableSchema`] to supply their
//! definition and validation; the definition itself is built once per
//! process and served from a global registry thereafter.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{SchemaError, ValidationError};
use crate::record::Record;
use crate::value::FieldValue;

/// Column type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// 64-bit integer column.
    BigInt,
    /// Text column, optionally bounded in length.
    Text { max_len: Option<usize> },
    /// Boolean column.
    Bool,
}

impl FieldType {
    /// Short tag used in validation diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BigInt => "bigint",
            Self::Text { .. } => "text",
            Self::Bool => "bool",
        }
    }

    /// Whether `value` is an instance of this column type.
    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (Self::BigInt, FieldValue::BigInt(_))
                | (Self::Text { .. }, FieldValue::Text(_))
                | (Self::Bool, FieldValue::Bool(_))
        )
    }
}

/// Descriptor for one field of a table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub field_type: FieldType,
    pub nullable: bool,
    pub default: Option<FieldValue>,
    pub primary_key: bool,
    pub auto_increment: bool,
}

impl FieldDef {
    /// New descriptor of the given type; nullable, no default, not a key.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            nullable: true,
            default: None,
            primary_key: false,
            auto_increment: false,
        }
    }

    /// BigInt column descriptor.
    pub fn big_int() -> Self {
        Self::new(FieldType::BigInt)
    }

    /// Text column descriptor bounded at `max_len` characters.
    pub fn text(max_len: usize) -> Self {
        Self::new(FieldType::Text {
            max_len: Some(max_len),
        })
    }

    /// Unbounded text column descriptor.
    pub fn text_unbounded() -> Self {
        Self::new(FieldType::Text { max_len: None })
    }

    /// Boolean column descriptor.
    pub fn boolean() -> Self {
        Self::new(FieldType::Bool)
    }

    /// Mark this field as part of the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark this field as auto-incremented by the backing store.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Reject NULL and absent values for this field.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Default value applied when the field is absent at build time.
    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Ordered table definition: identifier plus field descriptors in
/// declaration order.
///
/// Invariant: at least one field is marked primary-key; [`TableDef::new`]
/// refuses definitions that violate it.
#[derive(Debug, PartialEq, Eq)]
pub struct TableDef {
    name: &'static str,
    fields: Vec<(&'static str, FieldDef)>,
}

impl TableDef {
    /// Validate and construct a definition.
    pub fn new(
        name: &'static str,
        fields: Vec<(&'static str, FieldDef)>,
    ) -> Result<Self, SchemaError> {
        if !fields.iter().any(|(_, def)| def.primary_key) {
            return Err(SchemaError::NoPrimaryKey {
                table: name.to_string(),
            });
        }
        Ok(Self { name, fields })
    }

    /// Table identifier.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Field descriptors in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldDef)> {
        self.fields.iter().map(|(name, def)| (*name, def))
    }

    /// Descriptor for `field`, if declared.
    pub fn field(&self, field: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, def)| def)
    }

    /// Primary-key field names in declaration order.
    pub fn primary_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|(_, def)| def.primary_key)
            .map(|(name, _)| *name)
    }

    /// Check `record` against this definition's constraints.
    ///
    /// Returns the first violated constraint, or `None` when the record is
    /// valid. Auto-increment fields are exempt from the presence check:
    /// their value is assigned by the backing store on insert.
    pub fn validate(&self, record: &Record) -> Option<ValidationError> {
        for (name, def) in &self.fields {
            match record.get(name) {
                None => {
                    if !def.nullable && !def.auto_increment && def.default.is_none() {
                        return Some(ValidationError::RequiredFieldMissing {
                            field: name.to_string(),
                        });
                    }
                }
                Some(FieldValue::Null) => {
                    if !def.nullable {
                        return Some(ValidationError::RequiredFieldMissing {
                            field: name.to_string(),
                        });
                    }
                }
                Some(value) => {
                    if !def.field_type.accepts(value) {
                        return Some(ValidationError::TypeMismatch {
                            field: name.to_string(),
                            expected: def.field_type.name(),
                            got: value.type_name(),
                        });
                    }
                    if let (
                        FieldType::Text {
                            max_len: Some(max_len),
                        },
                        FieldValue::Text(text),
                    ) = (&def.field_type, value)
                    {
                        let len = text.chars().count();
                        if len > *max_len {
                            return Some(ValidationError::ValueTooLong {
                                field: name.to_string(),
                                max_len: *max_len,
                                len,
                            });
                        }
                    }
                }
            }
        }
        None
    }
}

/// Capability interface supplied by each concrete table type.
///
/// Replaces the original accessor-subclassing design with composition: a
/// table type contributes its identifier, definition, and validation, and
/// the generic accessor layers are parameterized over it.
pub trait TableSchema: Send + Sync + 'static {
    /// Table identifier; must match `definition().name()`.
    const TABLE: &'static str;

    /// The table definition, built once per process.
    fn definition() -> &'static TableDef;

    /// Check a record against schema constraints.
    fn validate(record: &Record) -> Option<ValidationError> {
        Self::definition().validate(record)
    }
}

// ============================================================================
// PROCESS-WIDE DEFINITION REGISTRY
// ============================================================================

static REGISTRY: Lazy<RwLock<HashMap<&'static str, &'static TableDef>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a definition under its table identifier.
///
/// Idempotent for the same definition instance; registering a different
/// definition under an existing name is a `DuplicateTable` error. Intended
/// to run at startup (typically from `TableSchema::definition`); the
/// registry is read-only afterwards.
pub fn register_table(def: &'static TableDef) -> Result<(), SchemaError> {
    let mut registry = REGISTRY
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    match registry.get(def.name()) {
        Some(existing) if std::ptr::eq(*existing, def) => Ok(()),
        Some(_) => Err(SchemaError::DuplicateTable {
            table: def.name().to_string(),
        }),
        None => {
            registry.insert(def.name(), def);
            Ok(())
        }
    }
}

/// Look up a registered definition by table identifier.
pub fn lookup_table(name: &str) -> Option<&'static TableDef> {
    REGISTRY
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .get(name)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use crate::record::Record;

    fn test_def() -> &'static TableDef {
        static DEF: Lazy<TableDef> = Lazy::new(|| {
            TableDef::new(
                "schema_test",
                vec![
                    ("id", FieldDef::big_int().primary_key().auto_increment()),
                    ("name", FieldDef::text(10).not_null()),
                    ("money", FieldDef::big_int().default_value(100)),
                    ("inquest", FieldDef::boolean().default_value(false)),
                ],
            )
            .expect("valid test definition")
        });
        &DEF
    }

    #[test]
    fn test_definition_requires_primary_key() {
        let result = TableDef::new("nokey", vec![("name", FieldDef::text(10))]);
        assert_eq!(
            result.unwrap_err(),
            SchemaError::NoPrimaryKey {
                table: "nokey".to_string()
            }
        );
    }

    #[test]
    fn test_primary_keys_in_declaration_order() {
        static DEF: Lazy<TableDef> = Lazy::new(|| {
            TableDef::new(
                "pair",
                vec![
                    ("left", FieldDef::big_int().primary_key()),
                    ("label", FieldDef::text(4)),
                    ("right", FieldDef::big_int().primary_key()),
                ],
            )
            .expect("valid test definition")
        });
        let keys: Vec<_> = DEF.primary_keys().collect();
        assert_eq!(keys, vec!["left", "right"]);
    }

    #[test]
    fn test_validate_accepts_defaulted_record() {
        let record = Record::build(test_def(), fields! { "name" => "foo" });
        assert_eq!(test_def().validate(&record), None);
    }

    #[test]
    fn test_validate_required_field_missing() {
        let mut record = Record::build(test_def(), fields! { "name" => "foo" });
        record.unset("name");
        assert_eq!(
            test_def().validate(&record),
            Some(ValidationError::RequiredFieldMissing {
                field: "name".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_null_on_not_null_field() {
        let mut record = Record::build(test_def(), fields! { "name" => "foo" });
        record
            .set("name", FieldValue::Null)
            .expect("name is declared");
        assert_eq!(
            test_def().validate(&record),
            Some(ValidationError::RequiredFieldMissing {
                field: "name".to_string()
            })
        );
    }

    #[test]
    fn test_validate_type_mismatch() {
        let mut record = Record::build(test_def(), fields! { "name" => "foo" });
        record.set("money", "rich").expect("money is declared");
        assert_eq!(
            test_def().validate(&record),
            Some(ValidationError::TypeMismatch {
                field: "money".to_string(),
                expected: "bigint",
                got: "text",
            })
        );
    }

    #[test]
    fn test_validate_text_length_bound() {
        let record = Record::build(test_def(), fields! { "name" => "far-too-long-name" });
        assert_eq!(
            test_def().validate(&record),
            Some(ValidationError::ValueTooLong {
                field: "name".to_string(),
                max_len: 10,
                len: 17,
            })
        );
    }

    #[test]
    fn test_validate_auto_increment_exempt_before_insert() {
        // `id` is absent until the backing store assigns it; that must not
        // fail validation even though the field is a key.
        let record = Record::build(test_def(), fields! { "name" => "foo" });
        assert!(record.get("id").is_none());
        assert_eq!(test_def().validate(&record), None);
    }

    #[test]
    fn test_registry_roundtrip_and_duplicate_rejection() {
        let def = test_def();
        register_table(def).expect("first registration succeeds");
        // Same instance is idempotent.
        register_table(def).expect("re-registration of same def succeeds");
        assert!(std::ptr::eq(
            lookup_table("schema_test").expect("registered"),
            def
        ));

        static OTHER: Lazy<TableDef> = Lazy::new(|| {
            TableDef::new(
                "schema_test",
                vec![("id", FieldDef::big_int().primary_key())],
            )
            .expect("valid test definition")
        });
        assert_eq!(
            register_table(&OTHER).unwrap_err(),
            SchemaError::DuplicateTable {
                table: "schema_test".to_string()
            }
        );
    }
}
