use actix_multipart::Multipart;
use common::requests::StartBatchRequest;
use futures_util::StreamExt;
use serde_json::from_slice;

/// The parts of a batch upload.
#[derive(Debug, Default)]
pub(crate) struct BatchUpload {
    /// The `json` part, when sent.
    pub request: Option<StartBatchRequest>,
    /// File name of the `file` part as sent by the browser.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Reads the `json` and `file` parts of a multipart body, refusing a file
/// larger than `limit` bytes. Unknown parts are skipped.
pub(crate) async fn read_upload(
    mut payload: Multipart,
    limit: usize,
) -> Result<BatchUpload, Box<dyn std::error::Error>> {
    let mut upload = BatchUpload::default();
    let mut file_seen = false;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match name.as_deref() {
            Some("file") => {
                upload.file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk?;
                    if upload.bytes.len() + chunk.len() > limit {
                        return Err(format!("The file exceeds the {} byte limit", limit).into());
                    }
                    upload.bytes.extend_from_slice(&chunk);
                }
                file_seen = true;
            }
            Some("json") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk?);
                }
                upload.request = Some(from_slice(&bytes)?);
            }
            _ => {}
        }
    }

    if !file_seen {
        return Err("Missing file".into());
    }
    Ok(upload)
}
