//! Handle `$filter`: a single `<property> <operator> <literal>` comparison.

use query_engine_metadata::metadata::{ComparisonOperator, EntityType};
use query_engine_sql::sql;

use crate::translation::error::Error;
use crate::translation::values;

/// A parsed `$filter`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpression {
    pub property: String,
    pub operator: ComparisonOperator,
    pub literal: serde_json::Value,
}

pub fn parse_filter(text: &str) -> Result<FilterExpression, Error> {
    let unsupported = || Error::UnsupportedFilterExpression(text.to_string());

    let (property, rest) = text.trim().split_once(char::is_whitespace).ok_or_else(unsupported)?;
    let (operator, literal) = rest
        .trim_start()
        .split_once(char::is_whitespace)
        .ok_or_else(unsupported)?;

    if !is_identifier(property) {
        return Err(unsupported());
    }
    let operator = ComparisonOperator::from_name(operator).ok_or_else(unsupported)?;
    let literal = values::parse_literal(literal).ok_or_else(unsupported)?;

    Ok(FilterExpression {
        property: property.to_string(),
        operator,
        literal,
    })
}

pub(crate) fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Translate a filter on the given table to a boolean expression.
///
/// Filters on properties the entity type does not have are skipped.
pub fn translate_filter(
    entity_type: &EntityType,
    table: &sql::ast::TableReference,
    filter: &FilterExpression,
) -> Result<Option<sql::ast::Expression>, Error> {
    let Some(property) = entity_type.property(&filter.property) else {
        tracing::warn!(
            entity_type = %entity_type.name,
            property = %filter.property,
            "Ignoring $filter on unknown property"
        );
        return Ok(None);
    };
    let column = sql::helpers::column_reference(table.clone(), &property.column.name);

    if filter.literal.is_null() {
        let is_null = sql::ast::Expression::UnaryOperation {
            expression: Box::new(column),
            operator: sql::ast::UnaryOperator::IsNull,
        };
        return match filter.operator {
            ComparisonOperator::Equals => Ok(Some(is_null)),
            ComparisonOperator::NotEquals => Ok(Some(sql::ast::Expression::Not(Box::new(is_null)))),
            _ => Err(Error::TypeMismatch {
                property: property.name.clone(),
                value: serde_json::Value::Null,
                scalar_type: property.column.r#type,
            }),
        };
    }

    let value = values::translate_json_value(&property.name, &filter.literal, &property.column)?;
    Ok(Some(sql::ast::Expression::BinaryOperation {
        left: Box::new(column),
        operator: binary_operator(filter.operator),
        right: Box::new(value),
    }))
}

fn binary_operator(operator: ComparisonOperator) -> sql::ast::BinaryOperator {
    let symbol = match operator {
        ComparisonOperator::Equals => "=",
        ComparisonOperator::NotEquals => "<>",
        ComparisonOperator::LessThan => "<",
        ComparisonOperator::LessThanOrEqualTo => "<=",
        ComparisonOperator::GreaterThan => ">",
        ComparisonOperator::GreaterThanOrEqualTo => ">=",
    };
    sql::ast::BinaryOperator(symbol.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_single_comparisons() {
        assert_eq!(
            parse_filter("Price gt 500"),
            Ok(FilterExpression {
                property: "Price".to_string(),
                operator: ComparisonOperator::GreaterThan,
                literal: json!(500),
            })
        );
        assert_eq!(
            parse_filter("  Name   eq 'Big Notebook' "),
            Ok(FilterExpression {
                property: "Name".to_string(),
                operator: ComparisonOperator::Equals,
                literal: json!("Big Notebook"),
            })
        );
        assert_eq!(
            parse_filter("Description ne null").map(|f| f.operator),
            Ok(ComparisonOperator::NotEquals)
        );
    }

    #[test]
    fn rejects_everything_else() {
        for filter in [
            "",
            "Price",
            "Price gt",
            "Price gt 500 and Price lt 900",
            "Price between 1",
            "contains(Name, 'x')",
            "Price GT 500",
            "Category/Name eq 'x'",
            "Name eq 'x' or 1 eq 1",
        ] {
            assert_eq!(
                parse_filter(filter),
                Err(Error::UnsupportedFilterExpression(filter.to_string())),
                "{filter}"
            );
        }
    }
}
