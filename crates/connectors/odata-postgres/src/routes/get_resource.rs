use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use tracing::{info_span, Instrument};

use query_engine_translation::translation::query;

use crate::{
    error::ServerError,
    request::{query_request, ResourcePath},
    response,
    state::ServerState,
};

/// Read an entity set, or a single entity when the path has a key.
pub async fn get_resource(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    Query(parameters): Query<Vec<(String, String)>>,
) -> Result<Response, ServerError> {
    let path = ResourcePath::parse(&resource)?;
    let single_entity = path.key.is_some();
    let request = query_request(path, &parameters)?;

    let model = state.introspector.scan().await?;
    let plan = query::translate(&model, &request)?;
    let entity_set = plan.shape.entity_set.as_str();

    let result = query_engine_execution::query::execute(
        &state.pool,
        &state.metrics,
        &plan,
        state.query_timeout,
    )
    .instrument(info_span!("Execute query", entity_set = %entity_set))
    .await?;

    if single_entity {
        let record = result
            .records
            .first()
            .ok_or_else(|| ServerError::EntityNotFound(resource.clone()))?;
        response::json(StatusCode::OK, &response::single_entity(entity_set, record))
    } else {
        response::json(StatusCode::OK, &response::collection(entity_set, &result))
    }
}
