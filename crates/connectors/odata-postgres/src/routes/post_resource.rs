use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use tracing::{info_span, Instrument};

use query_engine_execution::mutation::MutationOutcome;
use query_engine_translation::translation::mutation;

use crate::{
    error::ServerError,
    request::{parse_payload, ResourcePath},
    response,
    state::ServerState,
};

/// Create an entity. Answers 201 with the created entity, as stored.
pub async fn post_resource(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    body: Bytes,
) -> Result<Response, ServerError> {
    let path = ResourcePath::parse(&resource)?;
    path.forbid_key()?;
    let payload = parse_payload(&body)?;

    let model = state.introspector.scan().await?;
    let plan = mutation::translate_insert(&model, &path.entity_set, &payload)?;

    let outcome = query_engine_execution::mutation::execute(
        &state.pool,
        &state.metrics,
        &plan,
        state.query_timeout,
    )
    .instrument(info_span!("Execute create", entity_set = %path.entity_set))
    .await?;

    let MutationOutcome::Created(record) = outcome else {
        return Err(ServerError::Execution(
            query_engine_execution::error::QueryError::NothingReturned.into(),
        ));
    };

    let entity_set = model
        .lookup_entity_set(&path.entity_set)
        .map_or(path.entity_set.as_str(), |(set, _, _)| set.name.as_str());
    let mut created = response::json(
        StatusCode::CREATED,
        &response::single_entity(entity_set, &record),
    )?;
    if let Some(location) = record
        .id
        .as_ref()
        .and_then(|id| HeaderValue::from_str(&format!("/{id}")).ok())
    {
        created.headers_mut().insert(header::LOCATION, location);
    }
    Ok(created)
}
