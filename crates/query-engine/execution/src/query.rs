//! Execute a query plan against the database.

use std::future::Future;
use std::time::Duration;

use tracing::{info_span, Instrument};

use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::ExecutionPlan;

use crate::decode;
use crate::error::Error;
use crate::metrics;
use crate::record::QueryResult;

/// Execute a query against postgres and read the rows into entity records.
pub async fn execute(
    pool: &sqlx::PgPool,
    metrics: &metrics::Metrics,
    plan: &ExecutionPlan,
    deadline: Option<Duration>,
) -> Result<QueryResult, Error> {
    let query = plan.query();
    log_statement("query", &query);

    let rows = with_deadline(deadline, async {
        Ok(build_query_with_params(&query).fetch_all(pool).await?)
    })
    .instrument(info_span!("Database request"))
    .await
    .map_err(|error| {
        metrics.failure_total.inc();
        error
    })?;

    let records = async {
        rows.iter()
            .map(|row| decode::decode_row(row, &plan.shape))
            .collect::<Result<Vec<_>, _>>()
    }
    .instrument(info_span!("Map rows", rows = rows.len()))
    .await?;

    metrics.query_total.inc();
    // the count reflects the records returned by this same query
    let count = plan.want_count.then_some(records.len());
    Ok(QueryResult { records, count })
}

/// Run `SELECT 1` to check that the database is reachable.
pub async fn check_connection(pool: &sqlx::PgPool) -> Result<(), Error> {
    let query = sql::helpers::select_one().query();
    build_query_with_params(&query).execute(pool).await?;
    Ok(())
}

/// Create a SQLx query based on our SQL query and bind our parameters to it.
pub(crate) fn build_query_with_params(
    query: &sql::string::SQL,
) -> sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .params
        .iter()
        .fold(sqlx::query(query.sql.as_str()), |sqlx_query, param| match param {
            sql::string::Param::String(s) => sqlx_query.bind(s.as_str()),
            sql::string::Param::Int8(i) => sqlx_query.bind(*i),
            sql::string::Param::Float8(f) => sqlx_query.bind(*f),
            sql::string::Param::Bool(b) => sqlx_query.bind(*b),
        })
}

/// Fail with [`Error::Timeout`] when the future does not finish in time.
pub(crate) async fn with_deadline<T>(
    deadline: Option<Duration>,
    future: impl Future<Output = Result<T, Error>>,
) -> Result<T, Error> {
    match deadline {
        None => future.await,
        Some(duration) => tokio::time::timeout(duration, future)
            .await
            .map_err(|_| Error::Timeout(duration))?,
    }
}

pub(crate) fn log_statement(kind: &str, query: &sql::string::SQL) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        let pretty = sqlformat::format(
            &query.sql,
            &sqlformat::QueryParams::None,
            sqlformat::FormatOptions::default(),
        );
        tracing::debug!(kind, generated_sql = %pretty, params = ?&query.params, "Generated SQL");
    }
}
