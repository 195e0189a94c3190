//! An OData-style HTTP surface over the tables of a PostgreSQL schema.

pub mod error;
pub mod request;
pub mod response;
pub mod routes;
pub mod state;
