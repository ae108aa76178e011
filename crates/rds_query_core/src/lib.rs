//! Domain primitives for the RDS proxy query handler.
//!
//! This crate owns the data model, error taxonomy, trust-store building and
//! row mapping. It intentionally excludes AWS SDK, Lambda runtime and
//! database driver concerns.
//! See `crates/rds_query_core/README.md` for ownership boundaries.

pub mod config;
pub mod connection;
pub mod contract;
pub mod credential;
pub mod error;
pub mod executor;
pub mod rows;
pub mod trust;
