//! Handle the translation of literal values.

use query_engine_metadata::metadata::{ColumnInfo, ScalarType};
use query_engine_sql::sql;
use query_engine_sql::sql::helpers;

use super::error::Error;

/// Parse a URL literal: a single-quoted string (with `''` for a quote), a number,
/// `true`, `false`, `null`, or a bare token which is taken as a string.
///
/// Returns `None` for anything else.
pub fn parse_literal(text: &str) -> Option<serde_json::Value> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(quoted) = text.strip_prefix('\'') {
        return unquote(quoted.strip_suffix('\'')?).map(serde_json::Value::String);
    }
    match text {
        "null" => return Some(serde_json::Value::Null),
        "true" => return Some(serde_json::Value::Bool(true)),
        "false" => return Some(serde_json::Value::Bool(false)),
        _ => {}
    }
    if looks_numeric(text) {
        if let Ok(integer) = text.parse::<i64>() {
            return Some(serde_json::Value::from(integer));
        }
        // keeps every digit, which matters for numeric columns
        if let Ok(number) = text.parse::<serde_json::Number>() {
            return Some(serde_json::Value::Number(number));
        }
        if let Some(number) = text.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            return Some(serde_json::Value::Number(number));
        }
    }
    text.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | ':'))
        .then(|| serde_json::Value::String(text.to_string()))
}

fn looks_numeric(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+')
        && text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
}

/// The contents of a quoted literal, where every quote must be doubled.
fn unquote(inner: &str) -> Option<String> {
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\'' && chars.next() != Some('\'') {
            return None;
        }
        result.push(c);
    }
    Some(result)
}

/// Convert a JSON value into a SQL expression of the type of the given column.
pub fn translate_json_value(
    property: &str,
    value: &serde_json::Value,
    column: &ColumnInfo,
) -> Result<sql::ast::Expression, Error> {
    let mismatch = || Error::TypeMismatch {
        property: property.to_string(),
        value: value.clone(),
        scalar_type: column.r#type,
    };
    let as_value = |value| Ok(sql::ast::Expression::Value(value));
    let cast_text = |text: String| {
        Ok(helpers::cast(
            sql::ast::Expression::Value(sql::ast::Value::String(text)),
            &column.type_name,
        ))
    };

    match value {
        // null
        serde_json::Value::Null => as_value(sql::ast::Value::Null),

        // numbers
        serde_json::Value::Number(num) => match column.r#type {
            // integers, or a float when comparing an integer column with a fraction
            ScalarType::Smallint | ScalarType::Integer | ScalarType::Bigint => {
                match num.as_i64() {
                    Some(integer) => as_value(sql::ast::Value::Int8(integer)),
                    None => num
                        .as_f64()
                        .map_or_else(|| Err(mismatch()), |f| as_value(sql::ast::Value::Float8(f))),
                }
            }

            // floats
            ScalarType::Real | ScalarType::DoublePrecision => num
                .as_f64()
                .map_or_else(|| Err(mismatch()), |f| as_value(sql::ast::Value::Float8(f))),

            // exact numbers keep their textual form
            ScalarType::Numeric | ScalarType::Other => cast_text(num.to_string()),

            // strings
            ScalarType::Character | ScalarType::CharacterVarying | ScalarType::Text => {
                as_value(sql::ast::Value::String(num.to_string()))
            }

            ScalarType::Json | ScalarType::Jsonb => cast_text(value.to_string()),

            ScalarType::Boolean
            | ScalarType::Date
            | ScalarType::TimeWithTimeZone
            | ScalarType::TimeWithoutTimeZone
            | ScalarType::TimestampWithTimeZone
            | ScalarType::TimestampWithoutTimeZone
            | ScalarType::Uuid => Err(mismatch()),
        },

        // booleans
        serde_json::Value::Bool(b) => match column.r#type {
            ScalarType::Boolean => as_value(sql::ast::Value::Bool(*b)),
            ScalarType::Character | ScalarType::CharacterVarying | ScalarType::Text => {
                as_value(sql::ast::Value::String(b.to_string()))
            }
            ScalarType::Json | ScalarType::Jsonb | ScalarType::Other => cast_text(b.to_string()),
            _ => Err(mismatch()),
        },

        // strings
        serde_json::Value::String(s) => match column.r#type {
            ScalarType::Character | ScalarType::CharacterVarying | ScalarType::Text => {
                as_value(sql::ast::Value::String(s.clone()))
            }

            // for when numbers or booleans are passed as strings
            ScalarType::Boolean => match s.as_str() {
                "true" => as_value(sql::ast::Value::Bool(true)),
                "false" => as_value(sql::ast::Value::Bool(false)),
                _ => Err(mismatch()),
            },
            ScalarType::Smallint | ScalarType::Integer | ScalarType::Bigint => s
                .trim()
                .parse::<i64>()
                .map_or_else(|_| Err(mismatch()), |i| as_value(sql::ast::Value::Int8(i))),
            ScalarType::Real | ScalarType::DoublePrecision => s
                .trim()
                .parse::<f64>()
                .map_or_else(|_| Err(mismatch()), |f| as_value(sql::ast::Value::Float8(f))),

            // checked by the database
            ScalarType::Numeric
            | ScalarType::Date
            | ScalarType::TimeWithTimeZone
            | ScalarType::TimeWithoutTimeZone
            | ScalarType::TimestampWithTimeZone
            | ScalarType::TimestampWithoutTimeZone
            | ScalarType::Uuid
            | ScalarType::Other => cast_text(s.clone()),

            ScalarType::Json | ScalarType::Jsonb => cast_text(value.to_string()),
        },

        // structured values only fit json columns
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => match column.r#type {
            ScalarType::Json | ScalarType::Jsonb => cast_text(value.to_string()),
            _ => Err(mismatch()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_metadata::metadata::Nullable;
    use serde_json::json;

    fn column(r#type: ScalarType, type_name: &str) -> ColumnInfo {
        ColumnInfo {
            name: "c".to_string(),
            r#type,
            type_name: type_name.to_string(),
            nullable: Nullable::Nullable,
        }
    }

    #[test]
    fn parses_literals() {
        assert_eq!(parse_literal("500"), Some(json!(500)));
        assert_eq!(parse_literal("-3"), Some(json!(-3)));
        assert_eq!(parse_literal("1200.5"), Some(json!(1200.5)));
        assert_eq!(parse_literal("+7"), Some(json!(7)));
        assert_eq!(parse_literal("'Notebook'"), Some(json!("Notebook")));
        assert_eq!(parse_literal("'O''Brien'"), Some(json!("O'Brien")));
        assert_eq!(parse_literal("''"), Some(json!("")));
        assert_eq!(parse_literal("null"), Some(json!(null)));
        assert_eq!(parse_literal("true"), Some(json!(true)));
        assert_eq!(parse_literal("Notebook"), Some(json!("Notebook")));
        assert_eq!(parse_literal("2024-01-31"), Some(json!("2024-01-31")));
        assert_eq!(parse_literal("inf"), Some(json!("inf")));
    }

    #[test]
    fn rejects_malformed_literals() {
        assert_eq!(parse_literal(""), None);
        assert_eq!(parse_literal("'unterminated"), None);
        assert_eq!(parse_literal("'"), None);
        assert_eq!(parse_literal("'it's'"), None);
        assert_eq!(parse_literal("500 and Name eq 'x'"), None);
        assert_eq!(parse_literal("x; DROP TABLE product"), None);
        assert_eq!(parse_literal("length(Name)"), None);
    }

    #[test]
    fn numbers_follow_the_column_type() {
        assert_eq!(
            translate_json_value("c", &json!(5), &column(ScalarType::Integer, "int4")),
            Ok(sql::ast::Expression::Value(sql::ast::Value::Int8(5)))
        );
        assert_eq!(
            translate_json_value("c", &json!(5), &column(ScalarType::DoublePrecision, "float8")),
            Ok(sql::ast::Expression::Value(sql::ast::Value::Float8(5.0)))
        );
        assert_eq!(
            translate_json_value("c", &json!(5), &column(ScalarType::Text, "text")),
            Ok(sql::ast::Expression::Value(sql::ast::Value::String(
                "5".to_string()
            )))
        );
        assert_eq!(
            translate_json_value("c", &json!(1200.5), &column(ScalarType::Numeric, "numeric")),
            Ok(helpers::cast(
                sql::ast::Expression::Value(sql::ast::Value::String("1200.5".to_string())),
                "numeric"
            ))
        );
    }

    #[test]
    fn decimals_keep_their_digits() {
        let number = parse_literal("12345678901234567.89");
        assert_eq!(
            number.as_ref().map(ToString::to_string).as_deref(),
            Some("12345678901234567.89")
        );
        assert_eq!(
            number.map(|value| translate_json_value(
                "c",
                &value,
                &column(ScalarType::Numeric, "numeric")
            )),
            Some(Ok(helpers::cast(
                sql::ast::Expression::Value(sql::ast::Value::String(
                    "12345678901234567.89".to_string()
                )),
                "numeric"
            )))
        );
    }

    #[test]
    fn strings_are_checked_against_numeric_columns() {
        assert_eq!(
            translate_json_value("c", &json!("42"), &column(ScalarType::Bigint, "int8")),
            Ok(sql::ast::Expression::Value(sql::ast::Value::Int8(42)))
        );
        assert!(matches!(
            translate_json_value("c", &json!("abc"), &column(ScalarType::Bigint, "int8")),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            translate_json_value("c", &json!(true), &column(ScalarType::Date, "date")),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn other_types_are_cast_from_text() {
        assert_eq!(
            translate_json_value("c", &json!("2024-01-31"), &column(ScalarType::Date, "date")),
            Ok(helpers::cast(
                sql::ast::Expression::Value(sql::ast::Value::String("2024-01-31".to_string())),
                "date"
            ))
        );
        assert_eq!(
            translate_json_value("c", &json!({"a": 1}), &column(ScalarType::Jsonb, "jsonb")),
            Ok(helpers::cast(
                sql::ast::Expression::Value(sql::ast::Value::String(r#"{"a":1}"#.to_string())),
                "jsonb"
            ))
        );
        assert_eq!(
            translate_json_value("c", &json!(null), &column(ScalarType::Uuid, "uuid")),
            Ok(sql::ast::Expression::Value(sql::ast::Value::Null))
        );
    }
}
