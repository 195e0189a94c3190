//! Execute a mutation plan against the database.

use std::time::Duration;

use tracing::{info_span, Instrument};

use query_engine_sql::sql::execution_plan::MutationPlan;

use crate::decode;
use crate::error::{Error, QueryError};
use crate::metrics;
use crate::query::{build_query_with_params, log_statement, with_deadline};
use crate::record::EntityRecord;

/// What a mutation did.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The inserted row, as read back by RETURNING.
    Created(EntityRecord),
    Updated,
    /// The row to update does not exist.
    NotFound,
    Deleted { rows_affected: u64 },
}

/// Execute a mutation. Updates run in a transaction that first locks the row.
pub async fn execute(
    pool: &sqlx::PgPool,
    metrics: &metrics::Metrics,
    plan: &MutationPlan,
    deadline: Option<Duration>,
) -> Result<MutationOutcome, Error> {
    let kind = plan.kind();
    let outcome = with_deadline(deadline, run(pool, plan))
        .instrument(info_span!("Database mutation", kind))
        .await;
    match &outcome {
        Ok(_) => metrics.mutation_total.inc(),
        Err(_) => metrics.failure_total.inc(),
    }
    outcome
}

async fn run(pool: &sqlx::PgPool, plan: &MutationPlan) -> Result<MutationOutcome, Error> {
    match plan {
        MutationPlan::Insert { statement, shape } => {
            let query = statement.query();
            log_statement("insert", &query);
            let row = build_query_with_params(&query)
                .fetch_optional(pool)
                .await?
                .ok_or(QueryError::NothingReturned)?;
            Ok(MutationOutcome::Created(decode::decode_row(&row, shape)?))
        }
        MutationPlan::Update { lookup, update } => {
            let lookup = lookup.query();
            let update = update.as_ref().map(|update| update.query());

            let mut transaction = pool.begin().await?;
            log_statement("update", &lookup);
            let found = build_query_with_params(&lookup)
                .fetch_optional(&mut *transaction)
                .await?;
            if found.is_none() {
                transaction.rollback().await?;
                return Ok(MutationOutcome::NotFound);
            }
            if let Some(update) = &update {
                log_statement("update", update);
                build_query_with_params(update)
                    .execute(&mut *transaction)
                    .await?;
            }
            transaction.commit().await?;
            Ok(MutationOutcome::Updated)
        }
        MutationPlan::Delete { statement } => {
            let query = statement.query();
            log_statement("delete", &query);
            let result = build_query_with_params(&query).execute(pool).await?;
            if result.rows_affected() == 0 {
                tracing::debug!("DELETE matched no row");
            }
            Ok(MutationOutcome::Deleted {
                rows_affected: result.rows_affected(),
            })
        }
    }
}
