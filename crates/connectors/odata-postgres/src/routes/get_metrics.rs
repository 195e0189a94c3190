use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::Encoder;

use crate::{error::ServerError, state::ServerState};

/// The registered metrics in the prometheus text format.
pub async fn get_metrics(State(state): State<ServerState>) -> Result<Response, ServerError> {
    state.metrics.update_pool_metrics(&state.pool);

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = vec![];
    encoder.encode(&state.metrics_registry.gather(), &mut buffer)?;

    let content_type = HeaderValue::from_str(encoder.format_type())
        .unwrap_or_else(|_| HeaderValue::from_static("text/plain"));
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, content_type)], buffer).into_response())
}
