//! Handle `$expand` of a single navigation property with a LEFT OUTER JOIN.

use query_engine_metadata::metadata::{EntityType, NavigationProperty};
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::{ExpandShape, RowShape};

use super::filtering::is_identifier;
use crate::translation::error::Error;
use crate::translation::helpers::{self, Env};

/// The join, the extra select list entries, and the nested row shape of an expand.
pub struct Expansion {
    pub join: sql::ast::Join,
    pub select_list: Vec<(sql::ast::ColumnAlias, sql::ast::Expression)>,
    pub shape: ExpandShape,
}

/// Parse `$expand`, which must name a single navigation property.
pub fn parse_expand(text: &str) -> Result<String, Error> {
    let name = text.trim();
    if is_identifier(name) {
        Ok(name.to_string())
    } else {
        Err(Error::UnsupportedExpandExpression(text.to_string()))
    }
}

/// Translate an expand of the given navigation property. Unknown navigation
/// properties are skipped.
pub fn translate_expand(
    env: &Env<'_>,
    entity_type: &EntityType,
    main_table: &sql::ast::TableReference,
    navigation_property: &str,
) -> Option<Expansion> {
    let Some(navigation) = entity_type.navigation_property(navigation_property) else {
        tracing::warn!(
            entity_type = %entity_type.name,
            navigation_property,
            "Ignoring $expand of unknown navigation property"
        );
        return None;
    };
    let Some(target) = env.lookup_entity_type(&navigation.target_type) else {
        tracing::warn!(
            entity_type = %entity_type.name,
            navigation_property = %navigation.name,
            target_type = %navigation.target_type,
            "Ignoring $expand of a navigation property without an entity set"
        );
        return None;
    };

    let joined_alias = helpers::joined_table_alias();
    let joined_table = sql::ast::TableReference::AliasedTable(joined_alias.clone());
    let (select_list, columns) =
        helpers::select_properties(&joined_table, target.entity_type, Some(&navigation.name));

    let on = sql::helpers::equals(
        sql::helpers::column_reference(
            main_table.clone(),
            &foreign_key_column(entity_type, navigation),
        ),
        sql::helpers::column_reference(joined_table, &navigation.target_column),
    );

    Some(Expansion {
        join: sql::ast::Join::LeftOuterJoin(sql::ast::LeftOuterJoin {
            reference: env.table_reference(target.table),
            alias: joined_alias,
            on,
        }),
        select_list,
        shape: ExpandShape {
            navigation_property: navigation.name.clone(),
            shape: Box::new(RowShape {
                entity_set: target.entity_set.name.clone(),
                columns,
                key_properties: target.entity_type.key_properties.clone(),
                expand: None,
            }),
        },
    })
}

/// The column of the owning table that holds the foreign key.
///
/// This is the recorded foreign key column. When that is not a column of the
/// entity type, a property named `<nav>Id` or `<nav>ID` (any case) is used,
/// and failing that `<nav>ID` as is.
pub fn foreign_key_column(entity_type: &EntityType, navigation: &NavigationProperty) -> String {
    if entity_type
        .properties
        .iter()
        .any(|property| property.column.name == navigation.source_column)
    {
        return navigation.source_column.clone();
    }
    let candidate = format!("{}ID", navigation.name);
    match entity_type
        .properties
        .iter()
        .find(|property| property.name.eq_ignore_ascii_case(&candidate))
    {
        Some(property) => property.column.name.clone(),
        None => {
            tracing::warn!(
                entity_type = %entity_type.name,
                navigation_property = %navigation.name,
                column = %candidate,
                "No foreign key column found for navigation property, joining on a guessed column"
            );
            candidate
        }
    }
}
