//! Read the tables of the configured schema and build the entity model from them, once.

use std::sync::Arc;

use query_engine_metadata::metadata::{
    EntityModel, NamingConventions, SchemaModel, TableInfo, TablesInfo,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tokio::sync::OnceCell;
use tracing::{info_span, Instrument};

use crate::configuration::Configuration;
use crate::error::IntrospectionError;

const INTROSPECTION_QUERY: &str = include_str!("introspection.sql");

/// Something the tables of a schema can be read from.
#[async_trait::async_trait]
pub trait SchemaSource: Send + Sync {
    async fn scan(&self) -> Result<SchemaModel, IntrospectionError>;
}

/// Reads the schema from the database catalog.
#[derive(Debug, Clone)]
pub struct DatabaseIntrospector {
    pool: PgPool,
    schema_name: String,
    excluded_tables: Vec<String>,
}

impl DatabaseIntrospector {
    pub fn new(pool: PgPool, configuration: &Configuration) -> Self {
        DatabaseIntrospector {
            pool,
            schema_name: configuration.schema_name.clone(),
            excluded_tables: configuration.excluded_tables.clone(),
        }
    }
}

#[async_trait::async_trait]
impl SchemaSource for DatabaseIntrospector {
    async fn scan(&self) -> Result<SchemaModel, IntrospectionError> {
        let row = sqlx::query(INTROSPECTION_QUERY)
            .bind(&self.schema_name)
            .fetch_one(&self.pool)
            .instrument(info_span!("Introspect database", schema = %self.schema_name))
            .await?;
        let tables: Vec<TableInfo> = serde_json::from_value(row.try_get(0)?)?;

        Ok(SchemaModel {
            schema_name: self.schema_name.clone(),
            tables: filter_tables(tables, &self.excluded_tables),
        })
    }
}

/// Drop excluded tables (by case-insensitive name) and tables without columns.
pub fn filter_tables(tables: Vec<TableInfo>, excluded_tables: &[String]) -> TablesInfo {
    tables
        .into_iter()
        .filter(|table| {
            !excluded_tables
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(&table.table_name))
        })
        .filter(|table| {
            if table.columns.is_empty() {
                tracing::warn!(table = %table.table_name, "Skipping table without columns");
                false
            } else {
                true
            }
        })
        .collect()
}

/// Builds the entity model on first use and hands out the same model afterwards.
/// A failed scan is not remembered, so the next caller tries again.
pub struct SchemaIntrospector {
    source: Arc<dyn SchemaSource>,
    naming: NamingConventions,
    model: OnceCell<Arc<EntityModel>>,
}

impl SchemaIntrospector {
    pub fn new(source: Arc<dyn SchemaSource>, naming: NamingConventions) -> Self {
        SchemaIntrospector {
            source,
            naming,
            model: OnceCell::new(),
        }
    }

    /// The entity model, scanning the schema if no scan has succeeded yet.
    /// Concurrent first callers share a single scan.
    pub async fn scan(&self) -> Result<Arc<EntityModel>, IntrospectionError> {
        self.model
            .get_or_try_init(|| async {
                let schema = self.source.scan().await?;
                let model = EntityModel::new(schema, &self.naming);
                tracing::info!(
                    schema = %model.schema().schema_name,
                    entity_sets = model.entity_sets().count(),
                    "Built the entity model"
                );
                Ok::<_, IntrospectionError>(Arc::new(model))
            })
            .await
            .map(Arc::clone)
    }

    /// The entity model, if a scan has already succeeded.
    pub fn cached(&self) -> Option<Arc<EntityModel>> {
        self.model.get().cloned()
    }
}

impl std::fmt::Debug for SchemaIntrospector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaIntrospector")
            .field("naming", &self.naming)
            .field("scanned", &self.model.initialized())
            .finish_non_exhaustive()
    }
}

/// Create a connection pool. No connection is opened until one is needed.
pub fn create_pool(configuration: &Configuration) -> Result<PgPool, sqlx::Error> {
    let settings = &configuration.pool_settings;
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(settings.pool_timeout))
        .idle_timeout(settings.idle_timeout.map(std::time::Duration::from_secs))
        .max_lifetime(settings.connection_lifetime.map(std::time::Duration::from_secs))
        .connect_lazy(&configuration.connection_uri)
}
