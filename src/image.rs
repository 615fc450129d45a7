use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::ExtractError;

/// Media type used when the upload does not declare an `image/*` content type.
pub const DEFAULT_MEDIA_TYPE: &str = "image/png";

/// Uploaded image bytes, held only for the duration of one extraction.
///
/// The bytes are opaque: no decoding or re-encoding is performed, the model reads
/// whatever format was uploaded.
#[derive(Debug, Clone)]
pub struct RawImage {
    bytes: Vec<u8>,
    media_type: String,
}

impl RawImage {
    /// Wraps uploaded bytes, keeping the declared content type if it names an image.
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        let media_type = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .filter(|ct| ct.starts_with("image/") && ct.len() > "image/".len())
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());

        Self {
            bytes: bytes.into(),
            media_type,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Produces the base64 payload embedded in the OCR request.
    ///
    /// Fails with [`ExtractError::InvalidImage`] when there is nothing to encode.
    pub fn encode(&self) -> Result<EncodedImage, ExtractError> {
        if self.bytes.is_empty() {
            return Err(ExtractError::invalid_image("upload is empty"));
        }

        Ok(EncodedImage {
            media_type: self.media_type.clone(),
            payload: STANDARD.encode(&self.bytes),
        })
    }
}

/// Base64 form of a [`RawImage`], ready to be sent as a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    media_type: String,
    payload: String,
}

impl EncodedImage {
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.payload)
    }
}
