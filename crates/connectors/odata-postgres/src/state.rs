//! Transient state used by the server.
//!
//! This is initialized on startup.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info_span, Instrument};

use odata_postgres_configuration::introspection::create_pool;
use odata_postgres_configuration::{
    Configuration, DatabaseIntrospector, SchemaIntrospector, SchemaSource,
};
use query_engine_execution::metrics;

/// State shared by every request.
#[derive(Clone)]
pub struct ServerState {
    pub pool: sqlx::PgPool,
    pub introspector: Arc<SchemaIntrospector>,
    pub metrics: metrics::Metrics,
    pub metrics_registry: prometheus::Registry,
    pub query_timeout: Option<Duration>,
    pub strict_updates: bool,
}

impl ServerState {
    /// Assemble the state from an existing pool and schema source.
    pub fn new(
        configuration: &Configuration,
        pool: sqlx::PgPool,
        source: Arc<dyn SchemaSource>,
    ) -> Result<Self, InitializationError> {
        let mut metrics_registry = prometheus::Registry::new();
        let metrics = metrics::Metrics::initialize(&mut metrics_registry)
            .map_err(InitializationError::MetricsError)?;

        Ok(ServerState {
            pool,
            introspector: Arc::new(SchemaIntrospector::new(
                source,
                configuration.naming.clone(),
            )),
            metrics,
            metrics_registry,
            query_timeout: configuration.query_timeout,
            strict_updates: configuration.strict_updates,
        })
    }
}

/// Create a connection pool and wrap it inside a server state.
/// The schema is read when the first request needs it.
pub async fn create_state(configuration: &Configuration) -> Result<ServerState, InitializationError> {
    async {
        let pool = create_pool(configuration).map_err(InitializationError::UnableToCreatePool)?;
        let source = Arc::new(DatabaseIntrospector::new(pool.clone(), configuration));
        ServerState::new(configuration, pool, source)
    }
    .instrument(info_span!("Initialise state"))
    .await
}

/// State initialization error.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("unable to initialize connection pool: {0}")]
    UnableToCreatePool(sqlx::Error),
    #[error("error initializing metrics: {0}")]
    MetricsError(prometheus::Error),
}
