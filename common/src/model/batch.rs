use crate::model::content_type::ContentType;
use serde::{Deserialize, Serialize};

/// Default number of processed items between two progress notifications.
pub const DEFAULT_CHUNK: u32 = 250;

/// The worker-facing projection of a valid spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// 1-based row index, unique within a job.
    pub index: usize,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// The serialized payload that gets encoded into the QR symbol.
    pub payload: String,
    /// Filename-safe identifier used in the archive entry name.
    pub slug: String,
}

impl BatchItem {
    /// Archive entry name: `{index:04}_{type}_{slug}.{ext}`.
    pub fn entry_name(&self, format: OutputFormat) -> String {
        format!(
            "{:04}_{}_{}.{}",
            self.index,
            self.content_type,
            self.slug,
            format.extension()
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

/// QR error correction tier, from lowest to highest redundancy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

/// Style options applied to every symbol of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    pub error_correction: ErrorCorrection,
    /// Quiet zone width, in modules.
    pub margin: u32,
    /// Target image width, in pixels.
    pub size: u32,
    pub foreground: String,
    pub background: String,
    /// Items between progress notifications; `0` means [`DEFAULT_CHUNK`].
    pub chunk: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            error_correction: ErrorCorrection::M,
            margin: 4,
            size: 512,
            foreground: "#000000".to_string(),
            background: "#ffffff".to_string(),
            chunk: DEFAULT_CHUNK,
        }
    }
}

impl RenderOptions {
    /// The chunk size actually used by the worker, never zero.
    pub fn effective_chunk(&self) -> usize {
        if self.chunk == 0 {
            DEFAULT_CHUNK as usize
        } else {
            self.chunk as usize
        }
    }
}

/// One submission to the rendering worker.
///
/// `id` is fresh for every submission and correlates every message the worker
/// sends back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: String,
    pub items: Vec<BatchItem>,
    pub format: OutputFormat,
    pub options: RenderOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: usize, slug: &str) -> BatchItem {
        BatchItem {
            index,
            content_type: ContentType::Wifi,
            payload: "WIFI:T:nopass;S:guest;;".to_string(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn entry_name_pads_index_to_four_digits() {
        assert_eq!(
            item(7, "guest-net").entry_name(OutputFormat::Png),
            "0007_wifi_guest-net.png"
        );
        assert_eq!(
            item(12345, "big").entry_name(OutputFormat::Svg),
            "12345_wifi_big.svg"
        );
    }

    #[test]
    fn zero_chunk_falls_back_to_default() {
        let options = RenderOptions {
            chunk: 0,
            ..RenderOptions::default()
        };
        assert_eq!(options.effective_chunk(), 250);
    }

    #[test]
    fn options_deserialize_from_camel_case_with_defaults() {
        let options: RenderOptions =
            serde_json::from_str(r##"{"errorCorrection":"H","size":300}"##).unwrap();
        assert_eq!(options.error_correction, ErrorCorrection::H);
        assert_eq!(options.size, 300);
        assert_eq!(options.margin, 4);
        assert_eq!(options.chunk, DEFAULT_CHUNK);
    }
}
