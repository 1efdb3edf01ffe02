//! Types shared between the batch coordinator, the rendering worker and the
//! HTTP layer.
//!
//! - `model`: content type tags, spreadsheet rows and the batch job description.
//! - `jobs`: the worker message protocol and the job status reported to clients.
//! - `requests`: request payloads accepted by the HTTP service.

pub mod jobs;
pub mod model;
pub mod requests;
