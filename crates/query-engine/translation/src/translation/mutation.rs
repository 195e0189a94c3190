//! Translate creates, updates and deletes to INSERT, UPDATE and DELETE statements.

use query_engine_metadata::metadata::{EntityModel, EntityType};
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::{MutationPlan, RowShape};

use super::error::Error;
use super::helpers::{self, EntitySetInfo, Env};
use super::key;
use super::values;

/// A JSON object submitted as the body of a create or update.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// INSERT every property of the entity type. Properties missing from the
/// payload get their column default. The row is read back with RETURNING.
pub fn translate_insert(
    model: &EntityModel,
    entity_set: &str,
    payload: &Payload,
) -> Result<MutationPlan, Error> {
    let env = Env::new(model);
    let info = env.lookup_entity_set(entity_set)?;
    warn_about_unknown_keys(info.entity_type, payload);

    let (columns, values): (Vec<_>, Vec<_>) = info
        .entity_type
        .properties
        .iter()
        .map(|property| {
            let value = match helpers::find_payload_value(payload, &property.name) {
                Some(value) => sql::ast::MutationValueExpression::Expression(
                    values::translate_json_value(&property.name, value, &property.column)?,
                ),
                None => sql::ast::MutationValueExpression::Default,
            };
            Ok((sql::ast::ColumnName(property.column.name.clone()), value))
        })
        .collect::<Result<Vec<_>, Error>>()?
        .into_iter()
        .unzip();

    let alias = helpers::main_table_alias();
    let (returning, returned_columns) = helpers::select_properties(
        &sql::ast::TableReference::AliasedTable(alias.clone()),
        info.entity_type,
        None,
    );

    Ok(MutationPlan::Insert {
        statement: sql::ast::Insert {
            schema: sql::ast::SchemaName(model.schema().schema_name.clone()),
            table: sql::ast::TableName(info.table.table_name.clone()),
            alias,
            columns,
            values,
            returning: sql::ast::Returning(sql::ast::SelectList::SelectList(returning)),
        },
        shape: RowShape {
            entity_set: info.entity_set.name.clone(),
            columns: returned_columns,
            key_properties: info.entity_type.key_properties.clone(),
            expand: None,
        },
    })
}

/// Lock the addressed row, then assign only the properties present in the payload,
/// so every other property keeps its stored value.
pub fn translate_update(
    model: &EntityModel,
    entity_set: &str,
    key_predicate: &str,
    payload: &Payload,
) -> Result<MutationPlan, Error> {
    let env = Env::new(model);
    let info = env.lookup_entity_set(entity_set)?;
    let alias = helpers::main_table_alias();
    let table = sql::ast::TableReference::AliasedTable(alias.clone());
    let key_condition = key::key_condition(&info, &table, key_predicate)?;
    warn_about_unknown_keys(info.entity_type, payload);

    let set = info
        .entity_type
        .properties
        .iter()
        .filter_map(|property| {
            let value = helpers::find_payload_value(payload, &property.name)?;
            Some(
                values::translate_json_value(&property.name, value, &property.column).map(
                    |value| {
                        (
                            sql::ast::ColumnName(property.column.name.clone()),
                            sql::ast::MutationValueExpression::Expression(value),
                        )
                    },
                ),
            )
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let lookup = lock_row(&env, &info, alias.clone(), key_condition.clone())?;
    let update = (!set.is_empty()).then(|| sql::ast::Update {
        schema: sql::ast::SchemaName(model.schema().schema_name.clone()),
        table: sql::ast::TableName(info.table.table_name.clone()),
        alias,
        set,
        where_: sql::ast::Where(key_condition),
    });

    Ok(MutationPlan::Update { lookup, update })
}

/// DELETE the addressed row.
pub fn translate_delete(
    model: &EntityModel,
    entity_set: &str,
    key_predicate: &str,
) -> Result<MutationPlan, Error> {
    let env = Env::new(model);
    let info = env.lookup_entity_set(entity_set)?;
    let alias = helpers::main_table_alias();
    let key_condition = key::key_condition(
        &info,
        &sql::ast::TableReference::AliasedTable(alias.clone()),
        key_predicate,
    )?;

    Ok(MutationPlan::Delete {
        statement: sql::ast::Delete {
            schema: sql::ast::SchemaName(model.schema().schema_name.clone()),
            table: sql::ast::TableName(info.table.table_name.clone()),
            alias,
            where_: sql::ast::Where(key_condition),
        },
    })
}

/// `SELECT <key> FROM <table> AS "T" WHERE <key condition> FOR UPDATE`
fn lock_row(
    env: &Env<'_>,
    info: &EntitySetInfo<'_>,
    alias: sql::ast::TableAlias,
    key_condition: sql::ast::Expression,
) -> Result<sql::ast::Select, Error> {
    let key_property = key::key_property(info)?;
    let mut select = sql::helpers::simple_select(vec![sql::helpers::make_column(
        sql::ast::TableReference::AliasedTable(alias.clone()),
        sql::ast::ColumnName(key_property.column.name.clone()),
        sql::helpers::make_column_alias(key_property.name.clone()),
    )]);
    select.from = Some(sql::ast::From::Table {
        reference: env.table_reference(info.table),
        alias,
    });
    select.where_ = sql::ast::Where(key_condition);
    select.for_update = true;
    Ok(select)
}

fn warn_about_unknown_keys(entity_type: &EntityType, payload: &Payload) {
    for key in payload.keys() {
        if key.starts_with('@') || key.contains("@odata.") {
            continue;
        }
        if entity_type.property(key).is_none() {
            tracing::warn!(
                entity_type = %entity_type.name,
                property = %key,
                "Ignoring unknown property in payload"
            );
        }
    }
}
