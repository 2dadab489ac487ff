//! Database module: models, schema and storage for persistent state.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: pooled storage handles over the schema

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{AdminCredential, PredictionRecord, RetrainLog};
pub use schema::SQLITE_INIT;
pub use sqlite::{AdminStore, PredictionStore, SqlitePool, connect};
