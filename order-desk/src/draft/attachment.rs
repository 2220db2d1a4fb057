//! Payment screenshot attachment
//!
//! An attachment owns its bytes and a local preview file. The preview is a
//! [`NamedTempFile`], so it is removed when the attachment is replaced,
//! removed, or dropped together with its draft.

use crate::error::DraftError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use std::fmt;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Maximum attachment size (5MB)
pub const MAX_ATTACHMENT_SIZE: usize = 5 * 1024 * 1024;

pub struct PaymentAttachment {
    bytes: Vec<u8>,
    format: Option<ImageFormat>,
    preview: NamedTempFile,
}

impl PaymentAttachment {
    /// Takes ownership of the bytes and writes the preview file
    ///
    /// Non-image data is accepted here and reported by payment validation.
    pub fn new(bytes: Vec<u8>) -> Result<Self, DraftError> {
        if bytes.is_empty() {
            return Err(DraftError::Attachment("file is empty".into()));
        }
        if bytes.len() > MAX_ATTACHMENT_SIZE {
            return Err(DraftError::Attachment(format!(
                "file too large ({} bytes, max {})",
                bytes.len(),
                MAX_ATTACHMENT_SIZE
            )));
        }

        let format = image::guess_format(&bytes).ok();
        let suffix = format
            .and_then(|f| f.extensions_str().first())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let mut preview = tempfile::Builder::new()
            .prefix("payment-preview-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| DraftError::Attachment(format!("cannot create preview: {e}")))?;
        preview
            .write_all(&bytes)
            .and_then(|_| preview.flush())
            .map_err(|e| DraftError::Attachment(format!("cannot write preview: {e}")))?;

        tracing::debug!(size = bytes.len(), format = ?format, "Payment attachment acquired");
        Ok(Self {
            bytes,
            format,
            preview,
        })
    }

    /// Reads an attachment from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DraftError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| DraftError::Attachment(format!("cannot read {}: {e}", path.display())))?;
        Self::new(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn is_image(&self) -> bool {
        self.format.is_some()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream")
    }

    /// Local preview file; valid for as long as the attachment lives
    pub fn preview_path(&self) -> &Path {
        self.preview.path()
    }

    /// `data:<mime>;base64,<payload>` for the create-order request
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for PaymentAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentAttachment")
            .field("size", &self.bytes.len())
            .field("format", &self.format)
            .field("preview", &self.preview.path())
            .finish()
    }
}
