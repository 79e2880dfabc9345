//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the AccountRepository port
//! - An in-memory double for service-level tests

pub mod duckdb;

#[cfg(test)]
pub mod memory;
