//! Helpers for processing requests and building SQL.

use query_engine_metadata::metadata::{EntityModel, EntitySet, EntityType, TableInfo};
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::ColumnShape;

use super::error::Error;

/// The alias of the entity set's own table.
pub const MAIN_TABLE_ALIAS: &str = "T";
/// The alias of the table joined in by an expand.
pub const JOINED_TABLE_ALIAS: &str = "J";
/// Postgres truncates identifiers longer than this many bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Static information from the entity model.
#[derive(Debug, Clone, Copy)]
pub struct Env<'a> {
    model: &'a EntityModel,
}

/// An entity set together with its entity type and the table behind it.
#[derive(Debug, Clone, Copy)]
pub struct EntitySetInfo<'a> {
    pub entity_set: &'a EntitySet,
    pub entity_type: &'a EntityType,
    pub table: &'a TableInfo,
}

impl<'a> Env<'a> {
    pub fn new(model: &'a EntityModel) -> Env<'a> {
        Env { model }
    }

    pub fn lookup_entity_set(&self, entity_set_name: &str) -> Result<EntitySetInfo<'a>, Error> {
        let (entity_set, entity_type, table) = self
            .model
            .lookup_entity_set(entity_set_name)
            .ok_or_else(|| Error::UnknownEntitySet(entity_set_name.to_string()))?;
        Ok(EntitySetInfo {
            entity_set,
            entity_type,
            table,
        })
    }

    /// The entity set, type and table of the target of a navigation property.
    pub fn lookup_entity_type(&self, entity_type_name: &str) -> Option<EntitySetInfo<'a>> {
        let entity_type = self.model.entity_type(entity_type_name)?;
        let entity_set = self.model.entity_set_for_type(entity_type_name)?;
        let table = self.model.table_for_type(entity_type_name)?;
        Some(EntitySetInfo {
            entity_set,
            entity_type,
            table,
        })
    }

    /// The schema qualified reference to a table.
    pub fn table_reference(&self, table: &TableInfo) -> sql::ast::TableReference {
        sql::ast::TableReference::DBTable {
            schema: sql::ast::SchemaName(self.model.schema().schema_name.clone()),
            table: sql::ast::TableName(table.table_name.clone()),
        }
    }
}

pub fn main_table_alias() -> sql::ast::TableAlias {
    sql::helpers::make_table_alias(MAIN_TABLE_ALIAS.to_string())
}

pub fn joined_table_alias() -> sql::ast::TableAlias {
    sql::helpers::make_table_alias(JOINED_TABLE_ALIAS.to_string())
}

/// Select every property of an entity type from the given table.
///
/// Columns are aliased as the property name, prefixed by `<alias_prefix>_` if given.
/// A prefixed alias that Postgres would truncate is replaced by `J_<position>`,
/// the shape still maps it back to its property.
pub fn select_properties(
    table: &sql::ast::TableReference,
    entity_type: &EntityType,
    alias_prefix: Option<&str>,
) -> (
    Vec<(sql::ast::ColumnAlias, sql::ast::Expression)>,
    Vec<ColumnShape>,
) {
    entity_type
        .properties
        .iter()
        .enumerate()
        .map(|(position, property)| {
            let alias = sql::helpers::make_column_alias(match alias_prefix {
                Some(prefix) => {
                    let alias = format!("{prefix}_{}", property.name);
                    if alias.len() > MAX_IDENTIFIER_LENGTH {
                        format!("{JOINED_TABLE_ALIAS}_{position}")
                    } else {
                        alias
                    }
                }
                None => property.name.clone(),
            });
            let column = sql::helpers::column_reference(table.clone(), &property.column.name);
            let expression = if property.column.r#type.is_selected_as_text() {
                sql::helpers::cast(column, "text")
            } else {
                column
            };
            let shape = ColumnShape {
                property: property.name.clone(),
                alias: alias.clone(),
                scalar_type: property.column.r#type,
            };
            ((alias, expression), shape)
        })
        .unzip()
}

/// Find the payload entry for a property: an exact key wins, otherwise
/// the first key that matches case-insensitively.
pub fn find_payload_value<'p>(
    payload: &'p serde_json::Map<String, serde_json::Value>,
    property: &str,
) -> Option<&'p serde_json::Value> {
    payload.get(property).or_else(|| {
        payload
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    })
}
