//! Execution of plans against a PostgreSQL database, and the mapping of
//! result rows back into entity records.

pub mod decode;
pub mod error;
pub mod metrics;
pub mod mutation;
pub mod query;
pub mod record;
