//! Artwork files accepted for upload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Files above this size are accepted but logged; the storefront advertises it as the limit.
pub const RECOMMENDED_MAX_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtworkError {
    #[error("artwork file is empty")]
    Empty,

    #[error("unsupported artwork type {0:?}; use PNG, JPG or SVG")]
    UnsupportedType(String),

    #[error("artwork data is not valid base64: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtworkKind { Png, Jpeg, Svg }

impl ArtworkKind {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg => "image/svg+xml",
        }
    }

    /// Detects the kind from the declared MIME type, falling back to the file extension.
    pub fn detect(file_type: &str, file_name: &str) -> Option<Self> {
        let from_mime = match file_type.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/svg+xml" => Some(Self::Svg),
            _ => None,
        };
        from_mime.or_else(|| {
            let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
            match ext.as_str() {
                "png" => Some(Self::Png),
                "jpg" | "jpeg" => Some(Self::Jpeg),
                "svg" => Some(Self::Svg),
                _ => None,
            }
        })
    }
}

/// A decoded, type-checked artwork file.
#[derive(Clone, PartialEq, Eq)]
pub struct ArtworkUpload {
    file_name: String,
    kind: ArtworkKind,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ArtworkUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtworkUpload")
            .field("file_name", &self.file_name)
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ArtworkUpload {
    pub fn new(file_name: impl Into<String>, file_type: &str, bytes: Vec<u8>) -> Result<Self, ArtworkError> {
        let file_name = file_name.into();
        if bytes.is_empty() { return Err(ArtworkError::Empty); }
        let kind = ArtworkKind::detect(file_type, &file_name).ok_or_else(|| ArtworkError::UnsupportedType(file_type.to_string()))?;
        if bytes.len() > RECOMMENDED_MAX_BYTES {
            tracing::warn!(file = %file_name, bytes = bytes.len(), "artwork exceeds recommended size");
        }
        Ok(Self { file_name, kind, bytes })
    }

    /// Accepts raw base64 or a `data:<mime>;base64,` URL.
    pub fn from_base64(file_name: impl Into<String>, file_type: &str, data: &str) -> Result<Self, ArtworkError> {
        let payload = data.split_once("base64,").map_or(data, |(_, rest)| rest).trim();
        let bytes = STANDARD.decode(payload).map_err(|e| ArtworkError::Encoding(e.to_string()))?;
        Self::new(file_name, file_type, bytes)
    }

    pub fn file_name(&self) -> &str { &self.file_name }
    pub fn kind(&self) -> ArtworkKind { self.kind }
    pub fn len(&self) -> usize { self.bytes.len() }
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    pub fn to_request(&self) -> UploadRequest {
        UploadRequest {
            file_data: format!("data:{};base64,{}", self.kind.mime(), STANDARD.encode(&self.bytes)),
            file_name: self.file_name.clone(),
            file_type: self.kind.mime().to_string(),
        }
    }
}

/// Body of the upload request, shared by the storefront API and the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_data: String,
    pub file_name: String,
    #[serde(default)]
    pub file_type: String,
}

/// Where the backend stored the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredArtwork {
    pub public_url: String,
    #[serde(default)]
    pub path: Option<String>,
}
