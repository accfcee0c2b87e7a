//! PostgreSQL backend.

pub mod client;

pub use client::PostgreSqlClient;
