//! Translate a read of an entity set to a single SELECT.

pub mod filtering;
pub mod relationships;
pub mod sorting;

use query_engine_metadata::metadata::EntityModel;
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::{ExecutionPlan, RowShape};

use super::error::Error;
use super::helpers::{self, Env};
use super::key;

/// A read of an entity set, with the system query options still in their textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    pub entity_set: String,
    /// The text between the parentheses of `EntitySet(...)`.
    pub key: Option<String>,
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub expand: Option<String>,
    pub top: Option<u32>,
    pub skip: Option<u32>,
    pub count: bool,
}

impl QueryRequest {
    pub fn new(entity_set: impl Into<String>) -> Self {
        QueryRequest {
            entity_set: entity_set.into(),
            ..QueryRequest::default()
        }
    }
}

/// Translate a query request to an execution plan.
pub fn translate(model: &EntityModel, request: &QueryRequest) -> Result<ExecutionPlan, Error> {
    let env = Env::new(model);
    let info = env.lookup_entity_set(&request.entity_set)?;

    let main_alias = helpers::main_table_alias();
    let main_table = sql::ast::TableReference::AliasedTable(main_alias.clone());

    // The key goes first so it is the first bound parameter.
    let mut conditions = vec![];
    if let Some(key_predicate) = &request.key {
        conditions.push(key::key_condition(&info, &main_table, key_predicate)?);
    }

    let expand = request
        .expand
        .as_deref()
        .map(relationships::parse_expand)
        .transpose()?
        .and_then(|navigation_property| {
            relationships::translate_expand(&env, info.entity_type, &main_table, &navigation_property)
        });

    if let Some(filter) = &request.filter {
        let filter = filtering::parse_filter(filter)?;
        conditions.extend(filtering::translate_filter(
            info.entity_type,
            &main_table,
            &filter,
        )?);
    }

    let order_by = match &request.order_by {
        Some(order_by) => sorting::translate_order_by(
            info.entity_type,
            &main_table,
            &sorting::parse_order_by(order_by)?,
        ),
        None => sql::helpers::empty_order_by(),
    };

    let (mut select_list, columns) =
        helpers::select_properties(&main_table, info.entity_type, None);

    let mut select = sql::helpers::simple_select(vec![]);
    select.from = Some(sql::ast::From::Table {
        reference: env.table_reference(info.table),
        alias: main_alias,
    });
    let expand_shape = expand.map(|expansion| {
        select_list.extend(expansion.select_list);
        select.joins.push(expansion.join);
        expansion.shape
    });
    select.select_list = sql::ast::SelectList::SelectList(select_list);
    select.where_ = sql::ast::Where(
        conditions
            .into_iter()
            .reduce(sql::helpers::and)
            .unwrap_or_else(sql::helpers::empty_where),
    );
    select.order_by = order_by;
    select.limit = sql::ast::Limit {
        limit: request.top,
        offset: request.skip,
    };

    Ok(ExecutionPlan {
        select,
        shape: RowShape {
            entity_set: info.entity_set.name.clone(),
            columns,
            key_properties: info.entity_type.key_properties.clone(),
            expand: expand_shape,
        },
        want_count: request.count,
    })
}
