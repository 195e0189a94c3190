#![allow(dead_code)]

use query_engine_metadata::metadata::EntityModel;
use query_engine_sql::sql::execution_plan::MutationPlan;
use query_engine_sql::sql::string::{Param, SQL};
use query_engine_translation::translation;

pub use tests_common::fixtures::product_catalog_model;

/// Translate a read and return the SQL with its parameters.
pub fn translate_query(
    model: &EntityModel,
    request: &translation::query::QueryRequest,
) -> Result<(String, Vec<Param>), translation::error::Error> {
    let plan = translation::query::translate(model, request)?;
    Ok(split(plan.query()))
}

/// The statements of a mutation plan, in the order they are run.
pub fn mutation_statements(plan: &MutationPlan) -> Vec<(String, Vec<Param>)> {
    match plan {
        MutationPlan::Insert { statement, .. } => vec![split(statement.query())],
        MutationPlan::Update { lookup, update } => std::iter::once(lookup.query())
            .chain(update.iter().map(|update| update.query()))
            .map(split)
            .collect(),
        MutationPlan::Delete { statement } => vec![split(statement.query())],
    }
}

fn split(sql: SQL) -> (String, Vec<Param>) {
    (sql.sql, sql.params)
}
