use axum::{extract::State, http::StatusCode, response::Response};

use crate::{error::ServerError, response, state::ServerState};

pub async fn get_service_document(
    State(state): State<ServerState>,
) -> Result<Response, ServerError> {
    let model = state.introspector.scan().await?;
    response::json(StatusCode::OK, &response::service_document(&model))
}
