//! The on-disk configuration format.

use std::path::Path;

use query_engine_metadata::metadata::NamingConventions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{ParseConfigurationError, WriteParsedConfigurationError};
use crate::values::{ConnectionUri, PoolSettings, Secret};

pub const CONFIGURATION_FILENAME: &str = "configuration.json";
pub const CONFIGURATION_JSONSCHEMA_FILENAME: &str = "schema.json";
pub const DEFAULT_CONNECTION_URI_VARIABLE: &str = "ODATA_DATABASE_URL";

const DEFAULT_SCHEMA_NAME: &str = "public";
const DEFAULT_EXCLUDED_TABLES: [&str; 1] = ["flyway_schema_history"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Version {
    #[serde(rename = "1")]
    This,
}

/// The configuration of the service, as written in `configuration.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfiguration {
    /// Jsonschema of the configuration format.
    #[serde(rename = "$schema")]
    #[serde(default)]
    pub schema: Option<String>,
    pub version: Version,
    /// Connection string for a Postgres-compatible database
    pub connection_uri: ConnectionUri,
    /// The database schema whose tables are exposed.
    #[serde(default = "default_schema_name")]
    pub schema_name: String,
    /// Tables that are never exposed, matched case-insensitively.
    #[serde(default = "default_excluded_tables")]
    pub excluded_tables: Vec<String>,
    #[serde(default)]
    pub naming: NamingConventions,
    #[serde(default, skip_serializing_if = "PoolSettings::is_default")]
    pub pool_settings: PoolSettings,
    /// Deadline for a single database request (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_timeout: Option<u64>,
    /// Answer an update of a row that does not exist with 404 instead of 204.
    #[serde(default)]
    pub strict_updates: bool,
}

impl ParsedConfiguration {
    pub fn initial() -> Self {
        ParsedConfiguration {
            schema: Some(CONFIGURATION_JSONSCHEMA_FILENAME.to_string()),
            version: Version::This,
            connection_uri: ConnectionUri(Secret::FromEnvironment {
                variable: DEFAULT_CONNECTION_URI_VARIABLE.to_string(),
            }),
            schema_name: default_schema_name(),
            excluded_tables: default_excluded_tables(),
            naming: NamingConventions::default(),
            pool_settings: PoolSettings::default(),
            query_timeout: None,
            strict_updates: false,
        }
    }
}

fn default_schema_name() -> String {
    DEFAULT_SCHEMA_NAME.to_string()
}

fn default_excluded_tables() -> Vec<String> {
    DEFAULT_EXCLUDED_TABLES.map(String::from).to_vec()
}

/// Parse the configuration format from a directory.
pub async fn parse_configuration(
    configuration_dir: impl AsRef<Path>,
) -> Result<ParsedConfiguration, ParseConfigurationError> {
    let configuration_file = configuration_dir.as_ref().join(CONFIGURATION_FILENAME);

    let configuration_file_contents =
        fs::read_to_string(&configuration_file)
            .await
            .map_err(|err| {
                ParseConfigurationError::IoErrorButStringified(format!(
                    "{}: {}",
                    &configuration_file.display(),
                    err
                ))
            })?;

    let parsed_config: ParsedConfiguration = serde_json::from_str(&configuration_file_contents)
        .map_err(|error| ParseConfigurationError::ParseError {
            file_path: configuration_file.clone(),
            line: error.line(),
            column: error.column(),
            message: error.to_string(),
        })?;

    if parsed_config.schema_name.trim().is_empty() {
        return Err(ParseConfigurationError::Invalid {
            file_path: configuration_file,
            message: "schemaName must not be empty".to_string(),
        });
    }
    if parsed_config.pool_settings.max_connections == 0 {
        return Err(ParseConfigurationError::Invalid {
            file_path: configuration_file,
            message: "poolSettings.maxConnections must be at least 1".to_string(),
        });
    }

    Ok(parsed_config)
}

/// Write the parsed configuration into a directory on disk.
pub async fn write_parsed_configuration(
    parsed_config: ParsedConfiguration,
    out_dir: impl AsRef<Path>,
) -> Result<(), WriteParsedConfigurationError> {
    let configuration_file = out_dir.as_ref().to_owned().join(CONFIGURATION_FILENAME);
    fs::create_dir_all(out_dir.as_ref()).await?;

    // create the configuration file
    fs::write(
        configuration_file,
        serde_json::to_string_pretty(&parsed_config)
            .map_err(|e| WriteParsedConfigurationError::IoError(e.into()))?
            + "\n",
    )
    .await?;

    // create the jsonschema file
    let configuration_jsonschema_file_path = out_dir
        .as_ref()
        .to_owned()
        .join(CONFIGURATION_JSONSCHEMA_FILENAME);

    fs::write(
        &configuration_jsonschema_file_path,
        serde_json::to_string_pretty(&configuration_schema())
            .map_err(|e| WriteParsedConfigurationError::IoError(e.into()))?
            + "\n",
    )
    .await?;

    Ok(())
}

/// The JSON schema of `configuration.json`.
pub fn configuration_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(ParsedConfiguration)
}
