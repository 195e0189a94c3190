//! Translate incoming requests to execution plans (SQL) to be run against the database.

pub mod error;
pub mod helpers;
pub mod key;
pub mod mutation;
pub mod query;
pub mod values;
