use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use odata_postgres_configuration::error::IntrospectionError;
use query_engine_execution::error::Error as ExecutionError;
use query_engine_translation::translation::error::Error as TranslationError;

use crate::request::RequestError;

/// Everything a handler can fail with, and the HTTP status each one maps to.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    Request(#[from] RequestError),
    #[error("{0}")]
    Translation(#[from] TranslationError),
    #[error("No entity {0} was found.")]
    EntityNotFound(String),
    #[error("{0}")]
    Introspection(#[from] IntrospectionError),
    #[error("{0}")]
    Execution(#[from] ExecutionError),
    #[error("{0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Metrics(#[from] prometheus::Error),
}

#[derive(Serialize)]
struct JsonErrorResponse {
    error: JsonError,
}

#[derive(Serialize)]
struct JsonError {
    code: Option<String>,
    message: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Request(_) => StatusCode::BAD_REQUEST,
            ServerError::Translation(TranslationError::UnknownEntitySet(_))
            | ServerError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Translation(_) => StatusCode::BAD_REQUEST,
            ServerError::Introspection(_)
            | ServerError::Execution(_)
            | ServerError::Serialization(_)
            | ServerError::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client. Server faults only get a generic one.
    fn public_message(&self) -> String {
        match self {
            ServerError::Request(_)
            | ServerError::Translation(_)
            | ServerError::EntityNotFound(_) => self.to_string(),
            ServerError::Introspection(_) => "Unable to read the database schema.".to_string(),
            ServerError::Execution(ExecutionError::Timeout(_)) => {
                "The database request timed out.".to_string()
            }
            ServerError::Execution(_) => "The database request failed.".to_string(),
            ServerError::Serialization(_) | ServerError::Metrics(_) => {
                "Internal server error.".to_string()
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::info!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = JsonErrorResponse {
            error: JsonError {
                code: None,
                message: self.public_message(),
            },
        };
        (status, Json(body)).into_response()
    }
}
