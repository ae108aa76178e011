//! AWS-oriented adapters and the invocation handler for the RDS proxy query Lambda.
//!
//! This crate owns runtime integration details (ports for the secret store,
//! object store and database, the sqlx MySQL adapter, and the per-invocation
//! state machine). Domain types come from `rds_query_core`.
//! See `crates/rds_query_lambda/README.md` for ownership boundaries.

pub mod adapters;
pub mod handlers;
pub mod logging;
