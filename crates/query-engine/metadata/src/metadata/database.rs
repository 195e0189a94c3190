//! Metadata information regarding the database tables, as discovered by introspection.

use std::collections::BTreeMap;

use enum_iterator::Sequence;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The column types of the database, as named by `information_schema.columns.data_type`.
///
/// Anything we do not recognise (arrays, user-defined types, ranges, ...) is `Other`
/// and is exchanged as text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Sequence, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Boolean,
    Smallint,
    Integer,
    Bigint,
    Real,
    #[serde(rename = "double precision")]
    DoublePrecision,
    Numeric,
    Character,
    #[serde(rename = "character varying")]
    CharacterVarying,
    Text,
    Json,
    Jsonb,
    Date,
    #[serde(rename = "time with time zone")]
    TimeWithTimeZone,
    #[serde(rename = "time without time zone")]
    TimeWithoutTimeZone,
    #[serde(rename = "timestamp with time zone")]
    TimestampWithTimeZone,
    #[serde(rename = "timestamp without time zone")]
    TimestampWithoutTimeZone,
    Uuid,
    #[serde(other)]
    Other,
}

impl ScalarType {
    /// The wire-level primitive type this column type is exposed as.
    pub fn edm_type(self) -> EdmType {
        match self {
            ScalarType::Smallint | ScalarType::Integer => EdmType::Int32,
            ScalarType::Bigint => EdmType::Int64,
            ScalarType::Real | ScalarType::DoublePrecision => EdmType::Double,
            ScalarType::Numeric => EdmType::Decimal,
            ScalarType::Boolean => EdmType::Boolean,
            ScalarType::Date => EdmType::Date,
            ScalarType::TimestampWithTimeZone | ScalarType::TimestampWithoutTimeZone => {
                EdmType::DateTimeOffset
            }
            ScalarType::Character
            | ScalarType::CharacterVarying
            | ScalarType::Text
            | ScalarType::Json
            | ScalarType::Jsonb
            | ScalarType::TimeWithTimeZone
            | ScalarType::TimeWithoutTimeZone
            | ScalarType::Uuid
            | ScalarType::Other => EdmType::String,
        }
    }

    /// Values of these types cannot be decoded directly from a row, so we select
    /// them as text and interpret the text ourselves.
    pub fn is_selected_as_text(self) -> bool {
        matches!(
            self,
            ScalarType::Numeric
                | ScalarType::Json
                | ScalarType::Jsonb
                | ScalarType::TimeWithTimeZone
                | ScalarType::TimeWithoutTimeZone
                | ScalarType::Other
        )
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Smallint => "smallint",
            ScalarType::Integer => "integer",
            ScalarType::Bigint => "bigint",
            ScalarType::Real => "real",
            ScalarType::DoublePrecision => "double precision",
            ScalarType::Numeric => "numeric",
            ScalarType::Character => "character",
            ScalarType::CharacterVarying => "character varying",
            ScalarType::Text => "text",
            ScalarType::Json => "json",
            ScalarType::Jsonb => "jsonb",
            ScalarType::Date => "date",
            ScalarType::TimeWithTimeZone => "time with time zone",
            ScalarType::TimeWithoutTimeZone => "time without time zone",
            ScalarType::TimestampWithTimeZone => "timestamp with time zone",
            ScalarType::TimestampWithoutTimeZone => "timestamp without time zone",
            ScalarType::Uuid => "uuid",
            ScalarType::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// The small fixed set of primitive types every column is exposed as.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Sequence, Serialize, Deserialize, JsonSchema,
)]
pub enum EdmType {
    Int32,
    Int64,
    Double,
    Decimal,
    Boolean,
    Date,
    DateTimeOffset,
    String,
}

/// The comparison operators accepted in a `$filter`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Sequence,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
}

impl ComparisonOperator {
    /// The name of the operator in the filter grammar.
    pub fn name(self) -> &'static str {
        match self {
            Self::Equals => "eq",
            Self::NotEquals => "ne",
            Self::LessThan => "lt",
            Self::LessThanOrEqualTo => "le",
            Self::GreaterThan => "gt",
            Self::GreaterThanOrEqualTo => "ge",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        enum_iterator::all::<Self>().find(|operator| operator.name() == name)
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Mapping from an uppercased table name to its information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TablesInfo(pub BTreeMap<String, TableInfo>);

impl TablesInfo {
    /// The key a table is stored under.
    pub fn key(table_name: &str) -> String {
        table_name.to_uppercase()
    }

    /// Insert a table under its uppercased name, replacing any previous entry.
    pub fn insert(&mut self, table: TableInfo) -> Option<TableInfo> {
        self.0.insert(Self::key(&table.table_name), table)
    }

    /// Case-insensitive lookup by table name.
    pub fn get(&self, table_name: &str) -> Option<&TableInfo> {
        self.0.get(&Self::key(table_name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableInfo> {
        self.0.values()
    }
}

impl FromIterator<TableInfo> for TablesInfo {
    fn from_iter<I: IntoIterator<Item = TableInfo>>(iter: I) -> Self {
        let mut tables = TablesInfo::default();
        for table in iter {
            tables.insert(table);
        }
        tables
    }
}

/// Information about a database table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableInfo {
    pub table_name: String,
    /// Columns in ordinal position order.
    pub columns: Vec<ColumnInfo>,
    /// Primary key columns in key order.
    #[serde(default)]
    pub primary_key_columns: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyInfo>,
}

impl TableInfo {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Can this column contain null values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum Nullable {
    #[default]
    Nullable,
    NonNullable,
}

/// Information about a database column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnInfo {
    pub name: String,
    pub r#type: ScalarType,
    /// The underlying type name (`udt_name`), used when casting values to the column type.
    pub type_name: String,
    #[serde(default)]
    pub nullable: Nullable,
}

/// One column of an imported foreign key. A constraint over several columns
/// is listed once per column, under the same constraint name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKeyInfo {
    #[serde(default)]
    pub constraint_name: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}
