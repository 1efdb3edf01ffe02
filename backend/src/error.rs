/// Failures surfaced synchronously by the batch coordinator.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("No valid rows to submit")]
    EmptyBatch,

    #[error("Batch job {0} is still running")]
    JobInFlight(String),

    #[error("Batch worker is not available")]
    WorkerUnavailable,
}

/// Failures of the QR renderer for a single payload.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("Invalid color \"{0}\"")]
    InvalidColor(String),

    #[error("Image size too large: {0}px")]
    TooLarge(u64),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// Fatal failures while assembling a batch archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Failed to render row {index}: {source}")]
    Render { index: usize, source: RenderError },

    #[error("Invalid base64 image data for row {index}: {source}")]
    Decode {
        index: usize,
        source: base64::DecodeError,
    },

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while reading an uploaded spreadsheet.
#[derive(Debug, thiserror::Error)]
pub enum CsvSourceError {
    #[error("The file is empty")]
    Empty,

    #[error("CSV header cells must not be empty (column {0})")]
    EmptyHeader(usize),

    #[error("CSV is not valid UTF-8")]
    Encoding,

    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got \"{value}\"")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}
