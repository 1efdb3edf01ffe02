use crate::model::batch::{OutputFormat, RenderOptions};
use serde::Deserialize;

/// The `json` part of a `POST /api/batch/start` multipart request.
#[derive(Debug, Clone, Deserialize)]
pub struct StartBatchRequest {
    pub format: OutputFormat,
    /// Rendering options; omitted fields take their defaults.
    #[serde(default)]
    pub options: Option<RenderOptions>,
}
