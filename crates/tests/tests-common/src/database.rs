//! A throwaway copy of the product catalog in a live Postgres database.
//!
//! Tests using this are `#[ignore]`d and read the server address from
//! `ODATA_TEST_DATABASE_URL`.

use anyhow::Context;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;

/// The environment variable holding the connection URI of the test server.
pub const DATABASE_URL_VARIABLE: &str = "ODATA_TEST_DATABASE_URL";

const PRODUCT_CATALOG: &str = include_str!("product_catalog.sql");

/// A freshly created schema holding the product catalog, seeded with two
/// categories and two products.
pub struct TestDatabase {
    pub connection_uri: String,
    pub pool: PgPool,
    pub schema_name: String,
}

impl TestDatabase {
    /// Create a uniquely named schema and load the product catalog into it.
    pub async fn create() -> anyhow::Result<Self> {
        let connection_uri = std::env::var(DATABASE_URL_VARIABLE)
            .with_context(|| format!("{DATABASE_URL_VARIABLE} must be set"))?;
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&connection_uri)
            .await
            .context("connecting to the test database")?;

        let schema_name = format!("odata_test_{}", uuid::Uuid::new_v4().simple());
        let sql = PRODUCT_CATALOG.replace("__SCHEMA__", &schema_name);
        // without bind parameters this is sent as a simple query, which may
        // contain several statements
        pool.execute(sql.as_str())
            .await
            .with_context(|| format!("creating schema {schema_name}"))?;

        tracing::info!(schema = %schema_name, "Created test schema");
        Ok(TestDatabase {
            connection_uri,
            pool,
            schema_name,
        })
    }

    /// Drop the schema and everything in it.
    pub async fn drop_schema(self) -> anyhow::Result<()> {
        let sql = format!("DROP SCHEMA \"{}\" CASCADE", self.schema_name);
        self.pool.execute(sql.as_str()).await?;
        self.pool.close().await;
        Ok(())
    }
}
