//! Errors for translation.

use query_engine_metadata::metadata::ScalarType;

/// A type for translation errors. All of them are detected before any SQL runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown entity set '{0}'.")]
    UnknownEntitySet(String),
    #[error(
        "Entity set '{entity_set}' is addressed by a composite key of {key_count} parts, which is not supported."
    )]
    UnsupportedCompositeKey {
        entity_set: String,
        key_count: usize,
    },
    #[error("Entity set '{0}' has no primary key and cannot be addressed by key.")]
    MissingPrimaryKey(String),
    #[error("Invalid key predicate '{0}'.")]
    InvalidKeyPredicate(String),
    #[error("Unsupported $filter expression '{0}'. Expected '<property> <eq|ne|gt|ge|lt|le> <literal>'.")]
    UnsupportedFilterExpression(String),
    #[error("Unsupported $orderby expression '{0}'. Expected '<property> [asc|desc]'.")]
    UnsupportedOrderByExpression(String),
    #[error("Unsupported $expand expression '{0}'. Expected a single navigation property.")]
    UnsupportedExpandExpression(String),
    #[error("Value {value} cannot be used with property '{property}' of type {scalar_type}.")]
    TypeMismatch {
        property: String,
        value: serde_json::Value,
        scalar_type: ScalarType,
    },
}
