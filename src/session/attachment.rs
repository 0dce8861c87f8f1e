use crate::provider::{is_image_media_type, ImagePayload};
use crate::utils::SessionError;

/// Staged multi-modal input awaiting submission
#[derive(Debug, Clone, Default)]
pub struct AttachmentComposer {
    text: String,
    image: Option<ImagePayload>,
}

impl AttachmentComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    /// Replace the pending text; empty is allowed
    pub fn set_text(&mut self, value: impl Into<String>) {
        self.text = value.into();
    }

    /// Stage an image, replacing any previously staged one
    pub fn set_image(&mut self, payload: ImagePayload) -> Result<(), SessionError> {
        if !is_image_media_type(&payload.media_type) {
            return Err(SessionError::InvalidAttachment(payload.media_type));
        }
        self.image = Some(payload);
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn clear_text(&mut self) {
        self.text.clear();
    }

    /// Non-blank text or a staged image
    pub fn is_submittable(&self) -> bool {
        !self.text.trim().is_empty() || self.image.is_some()
    }
}
