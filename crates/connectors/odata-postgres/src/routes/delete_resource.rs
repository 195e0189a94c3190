use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{info_span, Instrument};

use query_engine_execution::mutation::MutationOutcome;
use query_engine_translation::translation::mutation;

use crate::{error::ServerError, request::ResourcePath, state::ServerState};

/// Delete an entity. Deleting one that does not exist also succeeds.
pub async fn delete_resource(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
) -> Result<StatusCode, ServerError> {
    let path = ResourcePath::parse(&resource)?;
    let key = path.require_key()?;

    let model = state.introspector.scan().await?;
    let plan = mutation::translate_delete(&model, &path.entity_set, key)?;

    let outcome = query_engine_execution::mutation::execute(
        &state.pool,
        &state.metrics,
        &plan,
        state.query_timeout,
    )
    .instrument(info_span!("Execute delete", entity_set = %path.entity_set))
    .await?;

    if let MutationOutcome::Deleted { rows_affected: 0 } = outcome {
        tracing::debug!(resource = %resource, "Delete matched no row");
    }
    Ok(StatusCode::NO_CONTENT)
}
