//! Common functions used across test cases.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use odata_postgres::{routes, state};
use odata_postgres_configuration::error::IntrospectionError;
use odata_postgres_configuration::introspection::create_pool;
use odata_postgres_configuration::version1::ParsedConfiguration;
use odata_postgres_configuration::{make_runtime_configuration, PoolSettings, SchemaSource};
use query_engine_metadata::metadata::SchemaModel;

/// Nothing listens here, so any request that reaches the database fails quickly.
pub const UNREACHABLE_DATABASE: &str = "postgresql://odata@127.0.0.1:1/odata";

/// Serves the product catalog after failing a given number of times.
pub struct FixtureSource {
    failures: usize,
    pub scans: AtomicUsize,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::failing(0)
    }

    pub fn failing(failures: usize) -> Self {
        FixtureSource {
            failures,
            scans: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl SchemaSource for FixtureSource {
    async fn scan(&self) -> Result<SchemaModel, IntrospectionError> {
        if self.scans.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(IntrospectionError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(tests_common::fixtures::product_catalog())
    }
}

/// Creates a router over the product catalog fixture and a pool that never connects.
pub fn create_router(source: Arc<FixtureSource>) -> axum::Router {
    tests_common::init_tracing();

    let parsed = ParsedConfiguration {
        connection_uri: UNREACHABLE_DATABASE.into(),
        pool_settings: PoolSettings {
            pool_timeout: 1,
            ..PoolSettings::default()
        },
        ..ParsedConfiguration::initial()
    };
    let configuration = make_runtime_configuration(parsed, HashMap::<String, String>::new()).unwrap();
    let pool = create_pool(&configuration).unwrap();
    let state = state::ServerState::new(&configuration, pool, source).unwrap();
    routes::create_router(state)
}

/// The message of an error body, checking its shape on the way.
pub fn error_message(body: &serde_json::Value) -> &str {
    assert_eq!(body["error"]["code"], serde_json::Value::Null, "{body}");
    body["error"]["message"].as_str().unwrap()
}
