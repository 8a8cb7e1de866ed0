//! The `user` table schema and its domain mutators.

use once_cell::sync::Lazy;

use crate::record::Record;
use crate::schema::{self, FieldDef, TableDef, TableSchema};
use crate::SchemaError;

/// Concrete table type for the `user` table.
///
/// Fields: `id` (bigint, pk, auto-increment), `name` (text ≤ 10, not
/// null), `money` (bigint, default 100), `energy` (bigint, default 30),
/// `inquest` (bool, default false).
pub struct User;

static USER_DEF: Lazy<TableDef> = Lazy::new(|| {
    TableDef::new(
        User::TABLE,
        vec![
            ("id", FieldDef::big_int().primary_key().auto_increment()),
            ("name", FieldDef::text(10).not_null()),
            ("money", FieldDef::big_int().default_value(100)),
            ("energy", FieldDef::big_int().default_value(30)),
            ("inquest", FieldDef::boolean().default_value(false)),
        ],
    )
    .expect("user table definition is valid")
});

impl TableSchema for User {
    const TABLE: &'static str = "user";

    fn definition() -> &'static TableDef {
        let def: &'static TableDef = &USER_DEF;
        // First access wins; later calls are idempotent for this instance.
        let _ = schema::register_table(def);
        def
    }
}

impl User {
    /// Rename a user record. Staging the change for persistence is the
    /// caller's concern.
    pub fn rename(record: &mut Record, name: &str) -> Result<(), SchemaError> {
        record.set("name", name)
    }
}
