//! Credit Report Normalization API Library
//!
//! Reads credit-bureau XML reports (`INProfileResponse`), normalizes them into
//! a flat [`NormalizedCreditReport`] and stores the result in PostgreSQL behind
//! a small HTTP upload API.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Document reading and normalization.
//! - `data`: Data access layer.
//! - `config`: Configuration management.
//! - `db`: Database connection and schema bootstrap.
//! - `db_storage`: Report storage operations.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Canonical report and API models.
//! - `normalizer`: Bureau tree to canonical record mapping.
//! - `routes`: Router assembly.
//! - `upload`: Upload boundary (extension and size checks).
//! - `xml_reader`: Generic XML to tree reader.

pub mod api;
pub mod core;
pub mod data;

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod routes;
pub mod upload;
pub mod xml_reader;

pub use errors::ReportError;
pub use models::NormalizedCreditReport;
pub use normalizer::{normalize, ReportNormalizer};
