//! Batch QR code generation: spreadsheet rows in, a zip of QR images out.

pub mod config;
pub mod data_sources;
pub mod error;
pub mod ingest;
pub mod job_controller;
pub mod registry;
pub mod services;
pub mod worker;
