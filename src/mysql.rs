//! MySQL backend.

pub mod client;

pub use client::MySqlClient;
