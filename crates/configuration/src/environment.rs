//! Where secrets given as environment variables are read from.

use std::collections::{BTreeMap, HashMap};

/// A source of environment variables.
pub trait Environment {
    fn read(&self, variable: &str) -> Result<String, EnvironmentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("the environment variable {0} is not set")]
    NotSet(String),
    #[error("the environment variable {0} does not contain valid unicode")]
    NotUnicode(String),
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn read(&self, variable: &str) -> Result<String, EnvironmentError> {
        std::env::var(variable).map_err(|error| match error {
            std::env::VarError::NotPresent => EnvironmentError::NotSet(variable.to_string()),
            std::env::VarError::NotUnicode(_) => EnvironmentError::NotUnicode(variable.to_string()),
        })
    }
}

/// A fixed set of variables, for tests and tools.
#[derive(Debug, Clone, Default)]
pub struct FixedEnvironment(BTreeMap<String, String>);

impl<const N: usize> From<[(String, String); N]> for FixedEnvironment {
    fn from(variables: [(String, String); N]) -> Self {
        FixedEnvironment(variables.into_iter().collect())
    }
}

impl Environment for FixedEnvironment {
    fn read(&self, variable: &str) -> Result<String, EnvironmentError> {
        self.0
            .get(variable)
            .cloned()
            .ok_or_else(|| EnvironmentError::NotSet(variable.to_string()))
    }
}

impl Environment for HashMap<String, String> {
    fn read(&self, variable: &str) -> Result<String, EnvironmentError> {
        self.get(variable)
            .cloned()
            .ok_or_else(|| EnvironmentError::NotSet(variable.to_string()))
    }
}
