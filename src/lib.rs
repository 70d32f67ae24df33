// ==========================================
// Tecnova POS - core library
// ==========================================
// Stack: Rust + SQLite (+ axum behind the `http` feature)
// Scope: inventory bulk import from CSV uploads
// ==========================================

// Message catalogues
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// Modules
// ==========================================

// Domain - entities and value types
pub mod domain;

// Repository - data access
pub mod repository;

// Importer - CSV upload pipeline
pub mod importer;

// Config - runtime tunables
pub mod config;

// Database bootstrap (connection PRAGMAs, schema)
pub mod db;

// Logging
pub mod logging;

// i18n
pub mod i18n;

// API - business entry points
pub mod api;

// App - state and HTTP transport
pub mod app;

// ==========================================
// Re-exports
// ==========================================

pub use domain::{
    CandidateRow, ImportMode, ImportOptions, ImportSummary, ProductRecord, ProductStatus,
    RowError, RowErrorCode,
};

pub use importer::{ImportError, ProductImporter, ProductImporterImpl};

pub use api::{ApiError, ImportApi, ImportRequest};

// ==========================================
// Constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Service name reported by /health
pub const APP_NAME: &str = "tecnova-pos";
