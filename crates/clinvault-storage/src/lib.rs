//! clinvault storage crate - local SQLite persistence for recordings and
//! anonymized clinical notes.
//!
//! One database file holds two key/value partitions, `recordings` and
//! `notes`, created lazily at schema version 1. Every write opens its own
//! connection, commits a single-partition transaction and closes the
//! connection again.

pub mod db;
pub mod migrations;
pub mod repository;
pub mod store;

pub use db::open_connection;
pub use migrations::{ensure_schema, partition_exists, schema_version};
pub use store::ClinicalStore;
