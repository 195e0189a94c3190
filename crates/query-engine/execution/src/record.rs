//! Entity records: the rows of a result, keyed by property name.

use indexmap::IndexMap;

/// One entity read from the database.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityRecord {
    /// `EntitySet(key)`, or `None` when the entity set has no key or the key is null.
    pub id: Option<String>,
    /// Property values in entity type order.
    pub properties: IndexMap<String, serde_json::Value>,
    /// Expanded navigation properties. A navigation property is absent when
    /// the join found no row.
    pub navigation_values: IndexMap<String, EntityRecord>,
}

/// The records returned by a query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub records: Vec<EntityRecord>,
    /// The number of records, when it was asked for.
    pub count: Option<usize>,
}

/// Build the id of an entity from its key property values.
///
/// A single key gives `Products(1)` or `Names('O''Brien')`. Several give
/// `OrderLines(OrderID=1,LineNo=2)`.
pub fn format_entity_id(
    entity_set: &str,
    key_properties: &[String],
    properties: &IndexMap<String, serde_json::Value>,
) -> Option<String> {
    let literals = key_properties
        .iter()
        .map(|key| properties.get(key).and_then(key_literal))
        .collect::<Option<Vec<_>>>()?;
    match literals.as_slice() {
        [] => None,
        [literal] => Some(format!("{entity_set}({literal})")),
        _ => {
            let segments = key_properties
                .iter()
                .zip(&literals)
                .map(|(key, literal)| format!("{key}={literal}"))
                .collect::<Vec<_>>();
            Some(format!("{entity_set}({})", segments.join(",")))
        }
    }
}

fn key_literal(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(format!("'{}'", text.replace('\'', "''"))),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Some(format!("'{}'", value.to_string().replace('\'', "''")))
        }
    }
}
