//! Handle `$orderby`: a single `<property> [asc|desc]` key.

use query_engine_metadata::metadata::EntityType;
use query_engine_sql::sql;

use super::filtering::is_identifier;
use crate::translation::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpression {
    pub property: String,
    pub direction: sql::ast::OrderByDirection,
}

pub fn parse_order_by(text: &str) -> Result<OrderByExpression, Error> {
    let unsupported = || Error::UnsupportedOrderByExpression(text.to_string());
    let tokens = text.split_whitespace().collect::<Vec<_>>();
    let (property, direction) = match tokens.as_slice() {
        [property] => (*property, sql::ast::OrderByDirection::Asc),
        [property, direction] if direction.eq_ignore_ascii_case("asc") => {
            (*property, sql::ast::OrderByDirection::Asc)
        }
        [property, direction] if direction.eq_ignore_ascii_case("desc") => {
            (*property, sql::ast::OrderByDirection::Desc)
        }
        _ => return Err(unsupported()),
    };
    if !is_identifier(property) {
        return Err(unsupported());
    }
    Ok(OrderByExpression {
        property: property.to_string(),
        direction,
    })
}

/// Translate an ordering on the given table. Unknown properties are skipped.
pub fn translate_order_by(
    entity_type: &EntityType,
    table: &sql::ast::TableReference,
    order_by: &OrderByExpression,
) -> sql::ast::OrderBy {
    let elements = match entity_type.property(&order_by.property) {
        Some(property) => vec![sql::ast::OrderByElement {
            target: sql::helpers::column_reference(table.clone(), &property.column.name),
            direction: order_by.direction,
        }],
        None => {
            tracing::warn!(
                entity_type = %entity_type.name,
                property = %order_by.property,
                "Ignoring $orderby on unknown property"
            );
            vec![]
        }
    };
    sql::ast::OrderBy { elements }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_defaults_to_ascending() {
        assert_eq!(
            parse_order_by("Price"),
            Ok(OrderByExpression {
                property: "Price".to_string(),
                direction: sql::ast::OrderByDirection::Asc,
            })
        );
        assert_eq!(
            parse_order_by("Price DESC").map(|o| o.direction),
            Ok(sql::ast::OrderByDirection::Desc)
        );
    }

    #[test]
    fn only_one_key_is_supported() {
        for order_by in ["", "Price desc, Name", "Price,Name", "Price sideways", "length(Name)"] {
            assert_eq!(
                parse_order_by(order_by),
                Err(Error::UnsupportedOrderByExpression(order_by.to_string()))
            );
        }
    }
}
