//! Benefits360 People API Library
//!
//! This library turns query results of unknown shape, returned by a vector
//! similarity search backend or a tabular SQL backend, into strongly typed
//! records: search hits become `{score, data}` records in backend rank order,
//! and person lookups become one canonical profile regardless of which table
//! answered.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core normalization and reconciliation logic.
//! - `integrations`: Backend integrations.
//! - `columns`: Column name resolution.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `db_storage`: Postgres tabular backend.
//! - `decoder`: Row shape decoding.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Request/response and profile models.
//! - `pipeline`: Result set normalization.
//! - `reconciler`: Primary/secondary profile lookup.
//! - `result_item`: Result item shape classification.
//! - `schema`: Source table schemas.
//! - `services`: Vector search client and search flow.

pub mod api;
pub mod core;
pub mod integrations;

pub mod columns;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod decoder;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod reconciler;
pub mod result_item;
pub mod schema;
pub mod services;
