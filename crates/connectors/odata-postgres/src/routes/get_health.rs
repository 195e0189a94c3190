use axum::{extract::State, http::StatusCode};

use crate::{error::ServerError, state::ServerState};

/// Succeeds when the database answers `SELECT 1`.
pub async fn get_health(State(state): State<ServerState>) -> Result<StatusCode, ServerError> {
    query_engine_execution::query::check_connection(&state.pool).await?;
    Ok(StatusCode::NO_CONTENT)
}
