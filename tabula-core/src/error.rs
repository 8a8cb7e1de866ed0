//! Error types for tabula operations.
//!
//! Every failure is surfaced to the immediate caller; the core performs no
//! local recovery or silent retry. Backing-store failures propagate through
//! the accessor layers unchanged.

use thiserror::Error;

/// Schema declaration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Table `{table}` declares no primary key field")]
    NoPrimaryKey { table: String },

    #[error("Field `{field}` is not declared on table `{table}`")]
    UnknownField { table: String, field: String },

    #[error("Table `{table}` is already registered with a different definition")]
    DuplicateTable { table: String },
}

/// Record identity errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// A primary-key field needed to identify a record has no value. A
    /// record whose generated key has not been assigned yet cannot be
    /// addressed by key.
    #[error("Primary key field `{field}` has no value on table `{table}`")]
    MissingKey { table: String, field: String },
}

/// Schema constraint violations raised when staging a write.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Type mismatch on {field}: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("Value too long for {field}: {len} chars, max {max_len}")]
    ValueTooLong {
        field: String,
        max_len: usize,
        len: usize,
    },
}

/// Cache reconciliation errors from the write-behind layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// Forging a record whose key is already known to exist in this request.
    #[error("Record already exists in cache: table `{table}`, key {unique_key}")]
    DuplicateKey { table: String, unique_key: String },

    /// Staging an update for a record already staged for deletion. The
    /// caller must re-forge to resurrect instead.
    #[error("Record already staged for deletion: table `{table}`, key {unique_key}")]
    AlreadyDeleted { table: String, unique_key: String },
}

/// Backing-store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Backend error: {reason}")]
    Backend { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Master error type for all tabula errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TabulaError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for tabula operations.
pub type TabulaResult<T> = Result<T, TabulaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_display() {
        let err = RecordError::MissingKey {
            table: "user".to_string(),
            field: "id".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Primary key field"));
        assert!(msg.contains("id"));
        assert!(msg.contains("user"));
    }

    #[test]
    fn test_cache_error_display() {
        let err = CacheError::AlreadyDeleted {
            table: "user".to_string(),
            unique_key: "5".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("already staged for deletion"));
        assert!(msg.contains("5"));

        let err = CacheError::DuplicateKey {
            table: "user".to_string(),
            unique_key: "5".to_string(),
        };
        assert!(format!("{}", err).contains("already exists"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::ValueTooLong {
            field: "name".to_string(),
            max_len: 10,
            len: 14,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("name"));
        assert!(msg.contains("10"));
        assert!(msg.contains("14"));
    }

    #[test]
    fn test_tabula_error_from_variants() {
        let record = TabulaError::from(RecordError::MissingKey {
            table: "user".to_string(),
            field: "id".to_string(),
        });
        assert!(matches!(record, TabulaError::Record(_)));

        let cache = TabulaError::from(CacheError::DuplicateKey {
            table: "user".to_string(),
            unique_key: "1".to_string(),
        });
        assert!(matches!(cache, TabulaError::Cache(_)));

        let storage = TabulaError::from(StorageError::LockPoisoned);
        assert!(matches!(storage, TabulaError::Storage(_)));
    }
}
