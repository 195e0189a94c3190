//! Errors that can be thrown when processing configuration.

/// The errors that can be thrown when parsing a configuration directory.
#[derive(Debug, thiserror::Error)]
pub enum ParseConfigurationError {
    #[error("parse error on {file_path}:{line}:{column}: {message}")]
    ParseError {
        file_path: std::path::PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("invalid configuration in {file_path}: {message}")]
    Invalid {
        file_path: std::path::PathBuf,
        message: String,
    },
    #[error("I/O error: {0}")]
    IoErrorButStringified(String),
}

/// The errors that can be thrown when writing a configuration directory.
#[derive(Debug, thiserror::Error)]
pub enum WriteParsedConfigurationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// The errors that can be thrown when turning a parsed configuration into a runtime one.
#[derive(Debug, thiserror::Error)]
pub enum MakeRuntimeConfigurationError {
    #[error("missing environment variable when processing {file_path}: {message}")]
    MissingEnvironmentVariable {
        file_path: std::path::PathBuf,
        message: String,
    },
}

/// The errors that can be thrown when reading the database schema.
#[derive(Debug, thiserror::Error)]
pub enum IntrospectionError {
    #[error("unable to read the database schema: {0}")]
    Database(#[from] sqlx::Error),
    #[error("unable to decode the database schema: {0}")]
    Decode(#[from] serde_json::Error),
}
