use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A binary image staged for a request, with its declared media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub data: Bytes,
    pub media_type: String,
}

impl ImagePayload {
    pub fn new(data: impl Into<Bytes>, media_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.into(),
        }
    }

    /// Lightweight description kept on the ledger instead of the bytes
    pub fn meta(&self) -> ImageMeta {
        ImageMeta {
            media_type: self.media_type.clone(),
            size_bytes: self.data.len(),
        }
    }
}

/// Metadata describing an image that accompanied a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMeta {
    pub media_type: String,
    pub size_bytes: usize,
}

/// Whether a declared media type names an image kind (`image/<subtype>`)
pub fn is_image_media_type(media_type: &str) -> bool {
    let lower = media_type.trim().to_ascii_lowercase();
    match lower.split_once('/') {
        Some((kind, subtype)) => kind == "image" && !subtype.is_empty(),
        None => false,
    }
}

/// One request to a provider backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub image: Option<ImagePayload>,
    pub system_prompt: Option<String>,
}
