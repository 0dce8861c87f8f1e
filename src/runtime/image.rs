use anyhow::{Context, Result};
use std::path::Path;

use crate::constants::IMAGE_EXTENSIONS;
use crate::provider::ImagePayload;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Media type implied by a file's extension
pub fn media_type_for(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return FALLBACK_MEDIA_TYPE;
    };
    IMAGE_EXTENSIONS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, media_type)| *media_type)
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}

/// Read a file into an image payload. Non-image files are not rejected here;
/// the composer refuses them by media type.
pub async fn load_image(path: &Path) -> Result<ImagePayload> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(ImagePayload::new(data, media_type_for(path)))
}
