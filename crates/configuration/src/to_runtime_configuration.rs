//! Convert the parsed configuration into the runtime one.

use std::path::PathBuf;
use std::time::Duration;

use crate::configuration::Configuration;
use crate::environment::Environment;
use crate::error::MakeRuntimeConfigurationError;
use crate::values::{ConnectionUri, Secret};
use crate::version1::{ParsedConfiguration, CONFIGURATION_FILENAME};

/// Resolve the secrets of a parsed configuration against the environment.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
    environment: impl Environment,
) -> Result<Configuration, MakeRuntimeConfigurationError> {
    let connection_uri = match parsed_config.connection_uri {
        ConnectionUri(Secret::Plain(uri)) => Ok(uri),
        ConnectionUri(Secret::FromEnvironment { variable }) => environment
            .read(&variable)
            .map_err(|error| MakeRuntimeConfigurationError::MissingEnvironmentVariable {
                file_path: PathBuf::from(CONFIGURATION_FILENAME),
                message: error.to_string(),
            }),
    }?;

    Ok(Configuration {
        connection_uri,
        schema_name: parsed_config.schema_name,
        excluded_tables: parsed_config.excluded_tables,
        naming: parsed_config.naming,
        pool_settings: parsed_config.pool_settings,
        query_timeout: parsed_config.query_timeout.map(Duration::from_secs),
        strict_updates: parsed_config.strict_updates,
    })
}
