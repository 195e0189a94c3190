//! Metadata information regarding the database and the entity model exposed over it.

pub mod database;
pub mod entity;
pub mod naming;

// re-export without modules
pub use database::*;
pub use entity::*;
pub use naming::*;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The tables of one database schema, as found by introspection.
/// Built once and never mutated afterwards.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaModel {
    pub schema_name: String,
    pub tables: TablesInfo,
}
