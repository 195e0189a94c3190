use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{info_span, Instrument};

use query_engine_execution::mutation::MutationOutcome;
use query_engine_translation::translation::mutation;

use crate::{
    error::ServerError,
    request::{parse_payload, ResourcePath},
    state::ServerState,
};

/// Update the properties given in the body. Serves both PUT and PATCH.
pub async fn put_resource(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ServerError> {
    let path = ResourcePath::parse(&resource)?;
    let key = path.require_key()?;
    let payload = parse_payload(&body)?;

    let model = state.introspector.scan().await?;
    let plan = mutation::translate_update(&model, &path.entity_set, key, &payload)?;

    let outcome = query_engine_execution::mutation::execute(
        &state.pool,
        &state.metrics,
        &plan,
        state.query_timeout,
    )
    .instrument(info_span!("Execute update", entity_set = %path.entity_set))
    .await?;

    match outcome {
        MutationOutcome::NotFound if state.strict_updates => {
            Err(ServerError::EntityNotFound(resource))
        }
        MutationOutcome::NotFound => {
            tracing::info!(resource = %resource, "Update matched no row");
            Ok(StatusCode::NO_CONTENT)
        }
        _ => Ok(StatusCode::NO_CONTENT),
    }
}
