//! The configuration the service runs with.

use std::time::Duration;

use query_engine_metadata::metadata::NamingConventions;

use crate::values::PoolSettings;

/// The runtime configuration, with every secret resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub connection_uri: String,
    pub schema_name: String,
    pub excluded_tables: Vec<String>,
    pub naming: NamingConventions,
    pub pool_settings: PoolSettings,
    pub query_timeout: Option<Duration>,
    pub strict_updates: bool,
}
