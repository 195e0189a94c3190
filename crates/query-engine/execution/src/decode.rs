//! Read result rows into entity records, directed by the column types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use sqlx::postgres::PgRow;
use sqlx::Row;

use query_engine_metadata::metadata::ScalarType;
use query_engine_sql::sql::execution_plan::{ColumnShape, RowShape};

use crate::error::QueryError;
use crate::record::{format_entity_id, EntityRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
// no offset: the column does not say which zone the value is in
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Build the record of a row. The expanded record is only attached when at
/// least one of its joined columns is not null.
pub fn decode_row(row: &PgRow, shape: &RowShape) -> Result<EntityRecord, QueryError> {
    let properties = decode_properties(row, &shape.columns)?;
    let id = format_entity_id(&shape.entity_set, &shape.key_properties, &properties);

    let mut navigation_values = IndexMap::new();
    if let Some(expand) = &shape.expand {
        let nested = decode_properties(row, &expand.shape.columns)?;
        if nested.values().any(|value| !value.is_null()) {
            navigation_values.insert(
                expand.navigation_property.clone(),
                EntityRecord {
                    id: format_entity_id(
                        &expand.shape.entity_set,
                        &expand.shape.key_properties,
                        &nested,
                    ),
                    properties: nested,
                    navigation_values: IndexMap::new(),
                },
            );
        }
    }

    Ok(EntityRecord {
        id,
        properties,
        navigation_values,
    })
}

fn decode_properties(
    row: &PgRow,
    columns: &[ColumnShape],
) -> Result<IndexMap<String, serde_json::Value>, QueryError> {
    columns
        .iter()
        .map(|column| Ok((column.property.clone(), decode_column(row, column)?)))
        .collect()
}

/// Read one column as a JSON value. SQL nulls become JSON nulls.
pub fn decode_column(row: &PgRow, column: &ColumnShape) -> Result<serde_json::Value, QueryError> {
    let index = column.alias.name.as_str();
    let decode_error = |source| QueryError::Decode {
        column: column.alias.name.clone(),
        scalar_type: column.scalar_type,
        source,
    };

    let value = match column.scalar_type {
        ScalarType::Boolean => row
            .try_get::<Option<bool>, _>(index)
            .map(|value| value.map(serde_json::Value::Bool)),
        ScalarType::Smallint => row
            .try_get::<Option<i16>, _>(index)
            .map(|value| value.map(serde_json::Value::from)),
        ScalarType::Integer => row
            .try_get::<Option<i32>, _>(index)
            .map(|value| value.map(serde_json::Value::from)),
        ScalarType::Bigint => row
            .try_get::<Option<i64>, _>(index)
            .map(|value| value.map(serde_json::Value::from)),
        ScalarType::Real => row
            .try_get::<Option<f32>, _>(index)
            .map(|value| value.map(|f| float(f64::from(f)))),
        ScalarType::DoublePrecision => row
            .try_get::<Option<f64>, _>(index)
            .map(|value| value.map(float)),
        ScalarType::Character | ScalarType::CharacterVarying | ScalarType::Text => row
            .try_get::<Option<String>, _>(index)
            .map(|value| value.map(serde_json::Value::String)),
        ScalarType::Date => row
            .try_get::<Option<NaiveDate>, _>(index)
            .map(|value| value.map(|date| serde_json::Value::String(date.format(DATE_FORMAT).to_string()))),
        ScalarType::TimestampWithTimeZone => row
            .try_get::<Option<DateTime<Utc>>, _>(index)
            .map(|value| value.map(|timestamp| format_timestamp(&timestamp))),
        ScalarType::TimestampWithoutTimeZone => row
            .try_get::<Option<NaiveDateTime>, _>(index)
            .map(|value| value.map(|timestamp| format_naive_timestamp(&timestamp))),
        ScalarType::Uuid => row
            .try_get::<Option<sqlx::types::Uuid>, _>(index)
            .map(|value| value.map(|uuid| serde_json::Value::String(uuid.to_string()))),
        ScalarType::Numeric
        | ScalarType::Json
        | ScalarType::Jsonb
        | ScalarType::TimeWithTimeZone
        | ScalarType::TimeWithoutTimeZone
        | ScalarType::Other => row
            .try_get::<Option<String>, _>(index)
            .map(|value| value.map(|text| parse_text_value(column.scalar_type, text))),
    };

    value
        .map(|value| value.unwrap_or(serde_json::Value::Null))
        .map_err(decode_error)
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> serde_json::Value {
    serde_json::Value::String(timestamp.format(TIMESTAMP_FORMAT).to_string())
}

fn format_naive_timestamp(timestamp: &NaiveDateTime) -> serde_json::Value {
    serde_json::Value::String(timestamp.format(NAIVE_TIMESTAMP_FORMAT).to_string())
}

/// Interpret a column that was selected as text.
///
/// Decimals become JSON numbers with every digit kept, and json columns
/// become their JSON value.
/// Anything that does not parse stays a string.
pub fn parse_text_value(scalar_type: ScalarType, text: String) -> serde_json::Value {
    match scalar_type {
        ScalarType::Numeric => match text.parse::<serde_json::Number>() {
            Ok(number) => serde_json::Value::Number(number),
            Err(_) => serde_json::Value::String(text),
        },
        ScalarType::Json | ScalarType::Jsonb => {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
        }
        _ => serde_json::Value::String(text),
    }
}

// NaN and the infinities have no JSON representation
fn float(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
}
